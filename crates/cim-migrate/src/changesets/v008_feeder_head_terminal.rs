//! Feeder head terminals drop the "normal" prefix.

use crate::change::{Change, ChangeSet};
use crate::error::CatalogError;
use crate::kind::DatabaseKind;

pub(super) fn changeset() -> Result<ChangeSet, CatalogError> {
    Ok(ChangeSet::new(
        8,
        vec![Change::new([
            "ALTER TABLE feeders RENAME COLUMN normal_head_terminal_mrid TO head_terminal_mrid",
        ])
        .only(&[DatabaseKind::NetworkModel])],
    ))
}
