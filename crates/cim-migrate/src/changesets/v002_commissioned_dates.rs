//! Commissioned dates for lines, consumers and transformer ends.

use crate::change::{Change, ChangeSet};
use crate::error::CatalogError;
use crate::kind::DatabaseKind;

pub(super) fn changeset() -> Result<ChangeSet, CatalogError> {
    Ok(ChangeSet::new(
        2,
        vec![Change::new([
            "ALTER TABLE ac_line_segments ADD COLUMN commissioned_date TEXT NULL",
            "ALTER TABLE energy_consumers ADD COLUMN commissioned_date TEXT NULL",
            "ALTER TABLE power_transformer_ends ADD COLUMN commissioned_date TEXT NULL",
        ])
        .only(&[DatabaseKind::NetworkModel])],
    ))
}
