//! Applies pending ChangeSets to one database.
//!
//! A run reads the stored version, then applies every later ChangeSet in id
//! order. Each ChangeSet gets its own transaction: the applicable statements
//! run, the version row is bumped, and the transaction commits. The first
//! failing statement rolls its ChangeSet back and ends the run, leaving the
//! database at the previous ChangeSet boundary. Nothing is retried.
//! Transaction control inside a ChangeSet statement is rejected, so a
//! statement cannot commit part of its ChangeSet.

use crate::catalog::ChangeSetCatalog;
use crate::change::ChangeSet;
use crate::error::{MigrationError, MigrationResult};
use crate::kind::DatabaseKind;
use crate::version::VersionStore;
use rusqlite::hooks::{AuthAction, AuthContext, Authorization};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::Serialize;

/// Lifecycle of a run.
///
/// `Idle → Running(id) → Committed(id) → Running(next) … → Done(version)`,
/// or `Failed(id)` as soon as a ChangeSet cannot be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "version", rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running(u32),
    Committed(u32),
    Done(u32),
    /// Failed inside the given ChangeSet, or `Failed(0)` before any ChangeSet
    /// was started.
    Failed(u32),
}

/// Execution record of one [`MigrationRunner::run`].
#[derive(Debug)]
pub struct MigrationRun {
    /// Kind of the database that was migrated.
    pub kind: DatabaseKind,
    /// Version before the run; `None` if it could not be read.
    pub starting_version: Option<u32>,
    /// ChangeSets that were started, in order.
    pub attempted: Vec<u32>,
    /// ChangeSets that committed, in order.
    pub committed: Vec<u32>,
    /// State the run ended in.
    pub state: RunState,
    /// Final version on success.
    pub outcome: MigrationResult<u32>,
}

impl MigrationRun {
    fn start(kind: DatabaseKind) -> Self {
        Self {
            kind,
            starting_version: None,
            attempted: Vec::new(),
            committed: Vec::new(),
            state: RunState::Idle,
            outcome: Ok(0),
        }
    }

    fn transition(&mut self, next: RunState) {
        log::debug!("{} migration: {:?} -> {:?}", self.kind, self.state, next);
        self.state = next;
    }

    fn finish(mut self, version: u32) -> Self {
        self.transition(RunState::Done(version));
        self.outcome = Ok(version);
        self
    }

    fn fail(mut self, error: MigrationError) -> Self {
        let changeset = error.changeset().unwrap_or(0);
        self.transition(RunState::Failed(changeset));
        self.outcome = Err(error);
        self
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Version the database is at after the run, whether it succeeded or not.
    pub fn final_version(&self) -> Option<u32> {
        self.committed.last().copied().or(self.starting_version)
    }

    pub fn into_result(self) -> MigrationResult<u32> {
        self.outcome
    }

    /// Serialisable summary of the run.
    pub fn report(&self) -> MigrationReport {
        let failure = self.outcome.as_ref().err().map(|error| {
            let (change, statement) = match error {
                MigrationError::StatementFailed {
                    change, statement, ..
                }
                | MigrationError::TransactionEnded {
                    change, statement, ..
                } => (Some(*change), Some(*statement)),
                _ => (None, None),
            };
            FailureReport {
                changeset: error.changeset(),
                change,
                statement,
                cause: error.to_string(),
            }
        });

        MigrationReport {
            kind: self.kind,
            starting_version: self.starting_version,
            final_version: self.final_version(),
            attempted: self.attempted.clone(),
            committed: self.committed.clone(),
            state: self.state,
            failure,
        }
    }
}

/// Machine-readable summary of a [`MigrationRun`].
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub kind: DatabaseKind,
    pub starting_version: Option<u32>,
    pub final_version: Option<u32>,
    pub attempted: Vec<u32>,
    pub committed: Vec<u32>,
    pub state: RunState,
    pub failure: Option<FailureReport>,
}

/// Where and why a run stopped.
#[derive(Debug, Clone, Serialize)]
pub struct FailureReport {
    pub changeset: Option<u32>,
    /// Index of the failing Change within its ChangeSet.
    pub change: Option<usize>,
    /// Index of the failing statement within its Change.
    pub statement: Option<usize>,
    pub cause: String,
}

/// Read-only preview of what a run would do.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationPlan {
    pub kind: DatabaseKind,
    /// Stored version; `None` for a database that has never been migrated.
    pub current_version: Option<u32>,
    /// Version the run would stop at.
    pub target_version: u32,
    pub pending: Vec<PendingChangeSet>,
}

impl MigrationPlan {
    pub fn is_up_to_date(&self) -> bool {
        self.pending.is_empty()
    }
}

/// One ChangeSet a run would apply.
#[derive(Debug, Clone, Serialize)]
pub struct PendingChangeSet {
    pub id: u32,
    /// Changes that apply to the planned kind.
    pub changes: usize,
    /// Statements that would execute against the planned kind.
    pub statements: usize,
}

/// Brings a database up to date against a [`ChangeSetCatalog`].
#[derive(Debug, Clone, Copy)]
pub struct MigrationRunner<'a> {
    catalog: &'a ChangeSetCatalog,
    target: Option<u32>,
}

impl<'a> MigrationRunner<'a> {
    pub fn new(catalog: &'a ChangeSetCatalog) -> Self {
        Self {
            catalog,
            target: None,
        }
    }

    /// Stop after ChangeSet `version` instead of the newest one.
    pub fn stop_at(mut self, version: u32) -> Self {
        self.target = Some(version);
        self
    }

    fn target_version(&self) -> u32 {
        let latest = self.catalog.latest();
        self.target.map_or(latest, |t| t.min(latest))
    }

    fn pending(&self, current: u32) -> &'a [ChangeSet] {
        let target = self.target_version();
        let catalog: &'a ChangeSetCatalog = self.catalog;
        let pending = catalog.pending(current);
        let end = pending.partition_point(|cs| cs.id() <= target);
        &pending[..end]
    }

    /// Apply every pending ChangeSet and return the final version.
    pub fn migrate(&self, conn: &mut Connection, kind: DatabaseKind) -> MigrationResult<u32> {
        self.run(conn, kind).into_result()
    }

    /// Apply every pending ChangeSet and return the full execution record.
    pub fn run(&self, conn: &mut Connection, kind: DatabaseKind) -> MigrationRun {
        let mut run = MigrationRun::start(kind);

        let current = match VersionStore::current_version(conn) {
            Ok(v) => v,
            Err(e) => return run.fail(e),
        };
        run.starting_version = Some(current);

        let supported = self.catalog.latest();
        if current > supported {
            return run.fail(MigrationError::SchemaTooNew {
                found: current,
                supported,
            });
        }

        let pending = self.pending(current);
        let Some(last) = pending.last() else {
            log::debug!("{kind} database is up to date at version {current}");
            return run.finish(current);
        };
        log::info!(
            "Migrating {kind} database from version {current} to {}",
            last.id()
        );

        for changeset in pending {
            let id = changeset.id();
            run.transition(RunState::Running(id));
            run.attempted.push(id);

            if let Err(e) = apply(conn, changeset, kind) {
                log::error!("{kind} migration stopped at ChangeSet {id}: {e}");
                return run.fail(e);
            }

            run.committed.push(id);
            run.transition(RunState::Committed(id));
            log::info!(
                "Applied ChangeSet {id} to {kind} database ({} statements)",
                changeset.statement_count(kind)
            );
        }

        run.finish(last.id())
    }

    /// Describe what [`MigrationRunner::run`] would do without writing
    /// anything to the database.
    pub fn plan(&self, conn: &Connection, kind: DatabaseKind) -> MigrationResult<MigrationPlan> {
        let current_version = VersionStore::read_version(conn)?;
        let current = current_version.unwrap_or(0);

        let supported = self.catalog.latest();
        if current > supported {
            return Err(MigrationError::SchemaTooNew {
                found: current,
                supported,
            });
        }

        let pending = self
            .pending(current)
            .iter()
            .map(|cs| PendingChangeSet {
                id: cs.id(),
                changes: cs.applicable(kind).count(),
                statements: cs.statement_count(kind),
            })
            .collect();

        Ok(MigrationPlan {
            kind,
            current_version,
            target_version: self.target_version().max(current),
            pending,
        })
    }
}

/// Apply one ChangeSet inside its own transaction.
fn apply(conn: &mut Connection, changeset: &ChangeSet, kind: DatabaseKind) -> MigrationResult<()> {
    let id = changeset.id();
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|source| MigrationError::Transaction {
            changeset: id,
            stage: "BEGIN",
            source,
        })?;

    // Statements may not end or restart the ChangeSet's transaction.
    tx.authorizer(Some(deny_transaction_control));
    let executed = execute_statements(&tx, changeset, kind);
    tx.authorizer(None::<fn(AuthContext<'_>) -> Authorization>);
    if let Err(e) = executed {
        rollback(tx, id);
        return Err(e);
    }

    if let Err(source) = VersionStore::record_version(&tx, id) {
        rollback(tx, id);
        return Err(MigrationError::VersionRecord {
            changeset: id,
            source,
        });
    }

    tx.commit().map_err(|source| MigrationError::Transaction {
        changeset: id,
        stage: "COMMIT",
        source,
    })
}

fn execute_statements(
    tx: &Transaction<'_>,
    changeset: &ChangeSet,
    kind: DatabaseKind,
) -> MigrationResult<()> {
    let id = changeset.id();
    for (change_index, change) in changeset.applicable(kind) {
        for (statement_index, sql) in change.statements().iter().enumerate() {
            log::debug!("ChangeSet {id} change {change_index} statement {statement_index}: {sql}");
            tx.execute_batch(sql)
                .map_err(|source| MigrationError::StatementFailed {
                    changeset: id,
                    change: change_index,
                    statement: statement_index,
                    sql: sql.clone(),
                    source,
                })?;
            if tx.is_autocommit() {
                return Err(MigrationError::TransactionEnded {
                    changeset: id,
                    change: change_index,
                    statement: statement_index,
                    sql: sql.clone(),
                });
            }
        }
    }
    Ok(())
}

fn deny_transaction_control(ctx: AuthContext<'_>) -> Authorization {
    match ctx.action {
        AuthAction::Transaction { .. } => Authorization::Deny,
        _ => Authorization::Allow,
    }
}

fn rollback(tx: Transaction<'_>, changeset: u32) {
    if let Err(e) = tx.rollback() {
        // Dropping the transaction retries the rollback.
        log::error!("Rollback of ChangeSet {changeset} failed: {e}");
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
