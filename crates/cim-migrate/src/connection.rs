//! Database connection wrapper.
//!
//! [`SchemaDb`] owns a SQLite [`Connection`] for one database file of a known
//! [`DatabaseKind`] and brings it to the newest schema version when opened.

use crate::catalog::ChangeSetCatalog;
use crate::changesets::builtin_catalog;
use crate::error::{MigrationError, MigrationResult};
use crate::kind::DatabaseKind;
use crate::runner::MigrationRunner;
use rusqlite::Connection;
use std::path::Path;

/// A migrated database file.
///
/// Migration needs exclusive access, so open the file here before handing the
/// connection to readers and writers.
pub struct SchemaDb {
    conn: Connection,
    kind: DatabaseKind,
    version: u32,
}

impl SchemaDb {
    /// Open (or create) the database at `path` and apply pending ChangeSets
    /// from the compiled-in history.
    pub fn open(path: &Path, kind: DatabaseKind) -> MigrationResult<Self> {
        Self::open_with(path, kind, builtin_catalog()?)
    }

    /// Like [`SchemaDb::open`] with an explicit catalog.
    pub fn open_with(
        path: &Path,
        kind: DatabaseKind,
        catalog: &ChangeSetCatalog,
    ) -> MigrationResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| MigrationError::Connection(format!("{e}: {}", path.display())))?;
        Self::migrated(conn, kind, catalog)
    }

    /// Create an in-memory database of `kind` at the newest schema version.
    ///
    /// Useful for tests that don't need persistence.
    pub fn open_memory(kind: DatabaseKind) -> MigrationResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| MigrationError::Connection(e.to_string()))?;
        Self::migrated(conn, kind, builtin_catalog()?)
    }

    fn migrated(
        mut conn: Connection,
        kind: DatabaseKind,
        catalog: &ChangeSetCatalog,
    ) -> MigrationResult<Self> {
        let version = MigrationRunner::new(catalog).migrate(&mut conn, kind)?;
        Ok(Self {
            conn,
            kind,
            version,
        })
    }

    pub fn kind(&self) -> DatabaseKind {
        self.kind
    }

    /// Schema version the database was left at by [`SchemaDb::open`].
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Borrow the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Give up the wrapper and keep the connection.
    pub fn into_inner(self) -> Connection {
        self.conn
    }
}

#[cfg(test)]
#[path = "connection_test.rs"]
mod tests;
