//! Energizing substations move from a feeder column to a link table.

use crate::change::{Change, ChangeSet};
use crate::error::CatalogError;
use crate::kind::DatabaseKind;
use crate::rebuild::TableRebuild;

pub(super) fn changeset() -> Result<ChangeSet, CatalogError> {
    let links = Change::new([
        "CREATE TABLE feeders_energizing_substations (\
            feeder_mrid TEXT NOT NULL, \
            substation_mrid TEXT NOT NULL)",
        "CREATE UNIQUE INDEX feeders_energizing_substations_feeder_mrid_substation_mrid \
            ON feeders_energizing_substations (feeder_mrid, substation_mrid)",
        "CREATE INDEX feeders_energizing_substations_substation_mrid \
            ON feeders_energizing_substations (substation_mrid)",
        "INSERT INTO feeders_energizing_substations (feeder_mrid, substation_mrid) \
            SELECT mrid, normal_energizing_substation_mrid FROM feeders \
            WHERE normal_energizing_substation_mrid IS NOT NULL",
    ])
    .only(&[DatabaseKind::NetworkModel]);

    let feeders = TableRebuild::new("feeders")
        .create(
            "CREATE TABLE feeders (\
                mrid TEXT NOT NULL, \
                name TEXT NOT NULL, \
                description TEXT NOT NULL, \
                num_diagram_objects INTEGER NOT NULL, \
                location_mrid TEXT NULL, \
                head_terminal_mrid TEXT NULL)",
        )
        .copy(&[
            "mrid",
            "name",
            "description",
            "num_diagram_objects",
            "location_mrid",
            "head_terminal_mrid",
        ])
        .index("CREATE UNIQUE INDEX feeders_mrid ON feeders (mrid)")
        .index("CREATE INDEX feeders_name ON feeders (name)")
        .into_change()?
        .only(&[DatabaseKind::NetworkModel]);

    Ok(ChangeSet::new(10, vec![links, feeders]))
}
