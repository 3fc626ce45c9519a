//! Link tables between agreements, pricing structures and tariffs.

use crate::change::{Change, ChangeSet};
use crate::error::CatalogError;
use crate::kind::DatabaseKind;

pub(super) fn changeset() -> Result<ChangeSet, CatalogError> {
    Ok(ChangeSet::new(
        7,
        vec![Change::new([
            "CREATE TABLE customer_agreements_pricing_structures (\
                customer_agreement_mrid TEXT NOT NULL, \
                pricing_structure_mrid TEXT NOT NULL)",
            "CREATE UNIQUE INDEX customer_agreements_pricing_structures_customer_agreement_mrid_pricing_structure_mrid \
                ON customer_agreements_pricing_structures (customer_agreement_mrid, pricing_structure_mrid)",
            "CREATE INDEX customer_agreements_pricing_structures_customer_agreement_mrid \
                ON customer_agreements_pricing_structures (customer_agreement_mrid)",
            "CREATE INDEX customer_agreements_pricing_structures_pricing_structure_mrid \
                ON customer_agreements_pricing_structures (pricing_structure_mrid)",
            "CREATE TABLE pricing_structures_tariffs (\
                pricing_structure_mrid TEXT NOT NULL, \
                tariff_mrid TEXT NOT NULL)",
            "CREATE UNIQUE INDEX pricing_structures_tariffs_pricing_structure_mrid_tariff_mrid \
                ON pricing_structures_tariffs (pricing_structure_mrid, tariff_mrid)",
            "CREATE INDEX pricing_structures_tariffs_pricing_structure_mrid \
                ON pricing_structures_tariffs (pricing_structure_mrid)",
            "CREATE INDEX pricing_structures_tariffs_tariff_mrid \
                ON pricing_structures_tariffs (tariff_mrid)",
        ])
        .only(&[DatabaseKind::Customer])],
    ))
}
