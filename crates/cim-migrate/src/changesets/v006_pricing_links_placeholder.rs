//! Pricing structure links, released without their tables.
//!
//! This ChangeSet shipped before its DDL was written. Databases already at
//! version 6 will never run it again, so it stays exactly as released and the
//! tables arrive in ChangeSet 7.

use crate::change::{Change, ChangeSet};
use crate::error::CatalogError;
use crate::kind::DatabaseKind;

pub(super) fn changeset() -> Result<ChangeSet, CatalogError> {
    Ok(ChangeSet::new(
        6,
        vec![Change::new(Vec::<String>::new()).only(&[DatabaseKind::Customer])],
    ))
}
