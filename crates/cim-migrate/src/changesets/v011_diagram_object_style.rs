//! Diagram object style becomes a required code; rotation defaults to 0.

use crate::change::ChangeSet;
use crate::error::CatalogError;
use crate::kind::DatabaseKind;
use crate::rebuild::TableRebuild;

pub(super) fn changeset() -> Result<ChangeSet, CatalogError> {
    let diagram_objects = TableRebuild::new("diagram_objects")
        .create(
            "CREATE TABLE diagram_objects (\
                mrid TEXT NOT NULL, \
                name TEXT NOT NULL, \
                description TEXT NOT NULL, \
                num_diagram_objects INTEGER NOT NULL, \
                identified_object_mrid TEXT NULL, \
                diagram_mrid TEXT NULL, \
                diagram_object_style TEXT NOT NULL DEFAULT 'NONE', \
                rotation NUMBER NOT NULL DEFAULT 0.0)",
        )
        .copy(&[
            "mrid",
            "name",
            "description",
            "num_diagram_objects",
            "identified_object_mrid",
            "diagram_mrid",
            "rotation",
        ])
        .copy_as("diagram_object_style", "COALESCE(style, 'NONE')")
        .index("CREATE UNIQUE INDEX diagram_objects_mrid ON diagram_objects (mrid)")
        .index("CREATE INDEX diagram_objects_name ON diagram_objects (name)")
        .index(
            "CREATE INDEX diagram_objects_identified_object_mrid \
                ON diagram_objects (identified_object_mrid)",
        )
        .index("CREATE INDEX diagram_objects_diagram_mrid ON diagram_objects (diagram_mrid)")
        .into_change()?
        .only(&[DatabaseKind::Diagram]);

    Ok(ChangeSet::new(11, vec![diagram_objects]))
}
