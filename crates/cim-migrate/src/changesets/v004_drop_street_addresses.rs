//! Street addresses are only kept in the network model.

use crate::change::{Change, ChangeSet};
use crate::error::CatalogError;
use crate::kind::DatabaseKind;

pub(super) fn changeset() -> Result<ChangeSet, CatalogError> {
    Ok(ChangeSet::new(
        4,
        vec![Change::new([
            "DROP INDEX location_street_addresses_location_mrid_address_field",
            "DROP INDEX location_street_addresses_location_mrid",
            "DROP TABLE location_street_addresses",
        ])
        .only(&[DatabaseKind::Diagram, DatabaseKind::Customer])],
    ))
}
