//! Persisted schema version of a database file.
//!
//! The version lives in a one-row, one-column table named `version`. It is
//! read once at the start of a run and rewritten inside every ChangeSet
//! transaction, so after a crash the file is always at a ChangeSet boundary.
//! Nothing but this module may touch the table.

use crate::error::{MigrationError, MigrationResult};
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};

/// Name of the table holding the schema version.
pub const VERSION_TABLE: &str = "version";

/// Reads and writes the schema version row.
pub struct VersionStore;

impl VersionStore {
    /// Return the stored version, creating the table with version 0 on a
    /// fresh database.
    pub fn current_version(conn: &mut Connection) -> MigrationResult<u32> {
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(MigrationError::VersionStore)?;

        tx.execute_batch("CREATE TABLE IF NOT EXISTS version (version INTEGER NOT NULL)")
            .map_err(MigrationError::VersionStore)?;

        let rows: i64 = tx
            .query_row("SELECT COUNT(*) FROM version", [], |row| row.get(0))
            .map_err(MigrationError::VersionStore)?;
        if rows == 0 {
            log::debug!("Initialising schema version table");
            tx.execute("INSERT INTO version (version) VALUES (0)", [])
                .map_err(MigrationError::VersionStore)?;
        }

        let version = read_single(&tx)?;
        tx.commit().map_err(MigrationError::VersionStore)?;
        Ok(version)
    }

    /// Return the stored version without creating anything; `None` when the
    /// database has never been migrated.
    pub fn read_version(conn: &Connection) -> MigrationResult<Option<u32>> {
        let exists = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [VERSION_TABLE],
                |_| Ok(()),
            )
            .optional()
            .map_err(MigrationError::VersionStore)?
            .is_some();
        if !exists {
            return Ok(None);
        }
        read_single(conn).map(Some)
    }

    /// Overwrite the stored version.
    ///
    /// Takes the ChangeSet's transaction so the version can only move together
    /// with the statements it vouches for.
    pub fn record_version(tx: &Transaction<'_>, version: u32) -> rusqlite::Result<()> {
        let updated = tx.execute("UPDATE version SET version = ?1", [version])?;
        if updated != 1 {
            return Err(rusqlite::Error::StatementChangedRows(updated));
        }
        Ok(())
    }
}

fn read_single(conn: &Connection) -> MigrationResult<u32> {
    let mut stmt = conn
        .prepare("SELECT version FROM version")
        .map_err(MigrationError::VersionStore)?;
    let values = stmt
        .query_map([], |row| row.get::<_, Option<i64>>(0))
        .map_err(MigrationError::VersionStore)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(MigrationError::VersionStore)?;

    match values.as_slice() {
        [Some(v)] => u32::try_from(*v)
            .map_err(|_| MigrationError::CorruptVersion(format!("version {v} is out of range"))),
        [None] => Err(MigrationError::CorruptVersion("version is NULL".into())),
        other => Err(MigrationError::CorruptVersion(format!(
            "expected exactly one row, found {}",
            other.len()
        ))),
    }
}
