//! Versioned schema migration engine for CIM databases.
//!
//! Three independently versioned SQLite files (network model, customer and
//! diagram) share one append-only history of [`ChangeSet`]s. Each file records
//! the id of the last ChangeSet fully applied to it; [`migrate`] brings a file
//! up to the newest version, one transaction per ChangeSet, skipping the
//! Changes that do not target the file's [`DatabaseKind`].

pub mod catalog;
pub mod change;
pub mod changesets;
pub mod connection;
pub mod error;
pub mod kind;
pub mod rebuild;
pub mod runner;
pub mod version;

pub use catalog::ChangeSetCatalog;
pub use change::{Change, ChangeSet};
pub use changesets::builtin_catalog;
pub use connection::SchemaDb;
pub use error::{CatalogError, MigrationError, MigrationResult};
pub use kind::DatabaseKind;
pub use rebuild::TableRebuild;
pub use runner::{MigrationPlan, MigrationReport, MigrationRun, MigrationRunner, RunState};
pub use version::VersionStore;

use rusqlite::Connection;

/// Bring `conn` up to the newest schema version for `kind`.
///
/// Uses the compiled-in ChangeSet history. Returns the version the database
/// is at when the call returns successfully; a second call against the same
/// database executes nothing and returns the same version.
pub fn migrate(conn: &mut Connection, kind: DatabaseKind) -> MigrationResult<u32> {
    let catalog = builtin_catalog()?;
    MigrationRunner::new(catalog).migrate(conn, kind)
}
