//! Battery energy ratings move from fractional kWh to integer Wh.

use crate::change::ChangeSet;
use crate::error::CatalogError;
use crate::kind::DatabaseKind;
use crate::rebuild::TableRebuild;

pub(super) fn changeset() -> Result<ChangeSet, CatalogError> {
    let battery_units = TableRebuild::new("battery_units")
        .create(
            "CREATE TABLE battery_units (\
                mrid TEXT NOT NULL, \
                name TEXT NOT NULL, \
                description TEXT NOT NULL, \
                num_diagram_objects INTEGER NOT NULL, \
                location_mrid TEXT NULL, \
                power_electronics_connection_mrid TEXT NULL, \
                max_p INTEGER NULL, \
                min_p INTEGER NULL, \
                battery_state TEXT NOT NULL, \
                rated_e INTEGER NULL, \
                stored_e INTEGER NULL)",
        )
        .copy(&[
            "mrid",
            "name",
            "description",
            "num_diagram_objects",
            "location_mrid",
            "power_electronics_connection_mrid",
            "max_p",
            "min_p",
            "battery_state",
        ])
        .copy_as("rated_e", "CAST(rated_e * 1000 AS INTEGER)")
        .copy_as("stored_e", "CAST(stored_e * 1000 AS INTEGER)")
        .index("CREATE UNIQUE INDEX battery_units_mrid ON battery_units (mrid)")
        .index("CREATE INDEX battery_units_name ON battery_units (name)")
        .index(
            "CREATE INDEX battery_units_power_electronics_connection_mrid \
                ON battery_units (power_electronics_connection_mrid)",
        )
        .into_change()?
        .only(&[DatabaseKind::NetworkModel]);

    Ok(ChangeSet::new(3, vec![battery_units]))
}
