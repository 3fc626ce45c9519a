//! Standard name types and phase connection codes.

use crate::change::{Change, ChangeSet};
use crate::error::CatalogError;
use crate::kind::DatabaseKind;

pub(super) fn changeset() -> Result<ChangeSet, CatalogError> {
    Ok(ChangeSet::new(
        9,
        vec![
            Change::new([
                "INSERT INTO name_types (name, description) \
                    SELECT 'NMI', 'National Meter Identifier' \
                    WHERE NOT EXISTS (SELECT 1 FROM name_types WHERE name = 'NMI')",
                "INSERT INTO name_types (name, description) \
                    SELECT 'GIS', 'Identifier in the source GIS' \
                    WHERE NOT EXISTS (SELECT 1 FROM name_types WHERE name = 'GIS')",
            ]),
            Change::new([
                "UPDATE energy_consumers SET phase_connection = 'D' WHERE phase_connection = 'DELTA'",
                "UPDATE energy_consumers SET phase_connection = 'Y' WHERE phase_connection = 'WYE'",
                "UPDATE energy_consumers SET phase_connection = 'Yn' WHERE phase_connection = 'WYE_N'",
            ])
            .only(&[DatabaseKind::NetworkModel]),
        ],
    ))
}
