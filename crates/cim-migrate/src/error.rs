//! Error types for the migration engine.

use thiserror::Error;

/// Problems with the ChangeSet history itself, detected before any database
/// is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// ChangeSet ids must run 1, 2, 3, ... with no holes (C001).
    #[error("[C001] ChangeSet ids are not contiguous: expected {expected}, found {found}")]
    Gap { expected: u32, found: u32 },

    /// Two ChangeSets were registered under the same id (C002).
    #[error("[C002] Duplicate ChangeSet id {id}")]
    Duplicate { id: u32 },

    /// A table rebuild was declared in a way that could lose data (C003).
    #[error("[C003] Invalid rebuild of table '{table}': {reason}")]
    InvalidRebuild { table: String, reason: String },
}

/// Migration engine errors.
#[derive(Error, Debug)]
pub enum MigrationError {
    /// Failed to open or configure the database file (M001).
    #[error("[M001] Database connection failed: {0}")]
    Connection(String),

    /// The compiled-in ChangeSet history is invalid (M002).
    #[error("[M002] ChangeSet catalog is invalid: {0}")]
    Catalog(#[from] CatalogError),

    /// A ChangeSet statement was rejected by the database (M003).
    #[error(
        "[M003] ChangeSet {changeset} failed at change {change}, statement {statement}: {source}\n  statement: {sql}"
    )]
    StatementFailed {
        changeset: u32,
        change: usize,
        statement: usize,
        sql: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Recording the new schema version failed; the ChangeSet was rolled back (M004).
    #[error("[M004] Failed to record schema version {changeset}: {source}")]
    VersionRecord {
        changeset: u32,
        #[source]
        source: rusqlite::Error,
    },

    /// BEGIN or COMMIT of a ChangeSet transaction failed (M005).
    #[error("[M005] Transaction {stage} failed for ChangeSet {changeset}: {source}")]
    Transaction {
        changeset: u32,
        stage: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// Reading or creating the version table failed (M006).
    #[error("[M006] Failed to read schema version: {0}")]
    VersionStore(#[source] rusqlite::Error),

    /// The version table does not hold exactly one non-negative integer (M007).
    #[error("[M007] Version table is corrupt: {0}")]
    CorruptVersion(String),

    /// The database was written by a newer release than this engine knows (M008).
    #[error("[M008] Database is at schema version {found}, newer than the latest supported version {supported}")]
    SchemaTooNew { found: u32, supported: u32 },

    /// SQLite driver error with preserved source chain (M009).
    #[error("[M009] SQLite error")]
    Sqlite(#[source] rusqlite::Error),

    /// A ChangeSet statement committed or rolled back the ChangeSet's own
    /// transaction (M010).
    #[error(
        "[M010] ChangeSet {changeset} ended its transaction at change {change}, statement {statement}\n  statement: {sql}"
    )]
    TransactionEnded {
        changeset: u32,
        change: usize,
        statement: usize,
        sql: String,
    },
}

impl MigrationError {
    /// The ChangeSet a failure happened in, if the failure belongs to one.
    pub fn changeset(&self) -> Option<u32> {
        match self {
            MigrationError::StatementFailed { changeset, .. }
            | MigrationError::VersionRecord { changeset, .. }
            | MigrationError::Transaction { changeset, .. }
            | MigrationError::TransactionEnded { changeset, .. } => Some(*changeset),
            _ => None,
        }
    }
}

/// Result type alias for [`MigrationError`].
pub type MigrationResult<T> = Result<T, MigrationError>;

impl From<rusqlite::Error> for MigrationError {
    fn from(err: rusqlite::Error) -> Self {
        MigrationError::Sqlite(err)
    }
}
