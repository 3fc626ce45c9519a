//! Customer kind and end device count become optional.

use crate::change::ChangeSet;
use crate::error::CatalogError;
use crate::kind::DatabaseKind;
use crate::rebuild::TableRebuild;

pub(super) fn changeset() -> Result<ChangeSet, CatalogError> {
    let customers = TableRebuild::new("customers")
        .create(
            "CREATE TABLE customers (\
                mrid TEXT NOT NULL, \
                name TEXT NOT NULL, \
                description TEXT NOT NULL, \
                num_diagram_objects INTEGER NOT NULL, \
                organisation_mrid TEXT NULL, \
                kind TEXT NULL, \
                num_end_devices INTEGER NULL)",
        )
        .copy(&[
            "mrid",
            "name",
            "description",
            "num_diagram_objects",
            "organisation_mrid",
            "kind",
            "num_end_devices",
        ])
        .index("CREATE UNIQUE INDEX customers_mrid ON customers (mrid)")
        .index("CREATE INDEX customers_name ON customers (name)")
        .index("CREATE INDEX customers_organisation_mrid ON customers (organisation_mrid)")
        .into_change()?
        .only(&[DatabaseKind::Customer]);

    Ok(ChangeSet::new(5, vec![customers]))
}
