//! Migrate command implementation
//!
//! Every selected database is migrated on its own blocking task with its own
//! connection. One failing database does not stop the others.

use anyhow::{Context, Result};
use chrono::Utc;
use cim_migrate::{builtin_catalog, DatabaseKind, MigrationReport, MigrationRunner};
use rusqlite::Connection;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::cli::{GlobalArgs, MigrateArgs, OutputFormat};
use crate::commands::common::{resolve_targets, version_label, ExitCode};
use crate::config::DatabaseEntry;

/// Result of migrating one database.
#[derive(Debug, Serialize)]
pub(crate) struct DatabaseOutcome {
    pub path: PathBuf,
    pub kind: DatabaseKind,
    /// Copy taken before the first ChangeSet ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<PathBuf>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub(crate) enum Outcome {
    /// The runner ran; its report says whether every ChangeSet committed.
    Ran { report: MigrationReport },
    /// The database could not be opened or backed up.
    Error { message: String },
}

impl DatabaseOutcome {
    pub(crate) fn is_success(&self) -> bool {
        matches!(&self.outcome, Outcome::Ran { report } if report.failure.is_none())
    }
}

/// Execute the migrate command
pub(crate) async fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let targets = resolve_targets(&args.target, global)?;
    let backup_dir = args.backup_dir.clone().or(targets.backup_dir);
    builtin_catalog().context("Compiled-in ChangeSet catalog is invalid")?;

    let mut tasks = Vec::with_capacity(targets.databases.len());
    for entry in targets.databases {
        let to = args.to;
        let backup_dir = backup_dir.clone();
        tasks.push(tokio::task::spawn_blocking(move || {
            migrate_database(&entry, to, backup_dir.as_deref())
        }));
    }

    let mut outcomes = Vec::with_capacity(tasks.len());
    for task in tasks {
        outcomes.push(task.await.context("Migration task panicked")?);
    }

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcomes)?),
        OutputFormat::Text => print_outcomes(&outcomes),
    }

    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    if failed > 0 {
        if args.output == OutputFormat::Text {
            eprintln!("\n{failed} of {} database(s) failed", outcomes.len());
        }
        return Err(ExitCode(1).into());
    }
    Ok(())
}

/// Migrate one database, optionally stopping at `to` and backing it up first.
pub(crate) fn migrate_database(
    entry: &DatabaseEntry,
    to: Option<u32>,
    backup_dir: Option<&Path>,
) -> DatabaseOutcome {
    let mut backup = None;
    let outcome = match run_migration(entry, to, backup_dir, &mut backup) {
        Ok(report) => Outcome::Ran { report },
        Err(e) => {
            log::error!("{}: {e:#}", entry.path.display());
            Outcome::Error {
                message: format!("{e:#}"),
            }
        }
    };
    DatabaseOutcome {
        path: entry.path.clone(),
        kind: entry.kind,
        backup,
        outcome,
    }
}

fn run_migration(
    entry: &DatabaseEntry,
    to: Option<u32>,
    backup_dir: Option<&Path>,
    backup: &mut Option<PathBuf>,
) -> Result<MigrationReport> {
    let catalog = builtin_catalog().context("Compiled-in ChangeSet catalog is invalid")?;
    let mut runner = MigrationRunner::new(catalog);
    if let Some(version) = to {
        runner = runner.stop_at(version);
    }

    let mut conn = Connection::open(&entry.path)
        .with_context(|| format!("Failed to open {}", entry.path.display()))?;

    if let Some(dir) = backup_dir {
        // A plan error (e.g. a newer schema) is reported by the run itself.
        if let Ok(plan) = runner.plan(&conn, entry.kind) {
            if let (false, Some(version)) = (plan.is_up_to_date(), plan.current_version) {
                *backup = Some(backup_database(&conn, &entry.path, dir, version)?);
            }
        }
    }

    Ok(runner.run(&mut conn, entry.kind).report())
}

/// Copy the database into `dir` with `VACUUM INTO`.
pub(crate) fn backup_database(
    conn: &Connection,
    source: &Path,
    dir: &Path,
    version: u32,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create backup directory {}", dir.display()))?;

    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("database");
    let stamp = Utc::now().format("%Y%m%dT%H%M%S%.3fZ");
    let target = dir.join(format!("{stem}-v{version}-{stamp}.sqlite"));
    let target_str = target
        .to_str()
        .with_context(|| format!("Backup path is not valid UTF-8: {}", target.display()))?;

    conn.execute("VACUUM INTO ?1", [target_str])
        .with_context(|| format!("Failed to back up {} to {target_str}", source.display()))?;
    log::info!("Backed up {} to {target_str}", source.display());
    Ok(target)
}

fn print_outcomes(outcomes: &[DatabaseOutcome]) {
    for o in outcomes {
        let label = format!("{} ({})", o.path.display(), o.kind);
        match &o.outcome {
            Outcome::Error { message } => println!("  FAIL {label}: {message}"),
            Outcome::Ran { report } => match &report.failure {
                Some(failure) => println!(
                    "  FAIL {label}: left at version {}: {}",
                    version_label(report.final_version),
                    failure.cause
                ),
                None if report.committed.is_empty() => println!(
                    "  OK   {label}: up to date at version {}",
                    version_label(report.final_version)
                ),
                None => println!(
                    "  OK   {label}: version {} -> {} ({} ChangeSet(s))",
                    version_label(report.starting_version),
                    version_label(report.final_version),
                    report.committed.len()
                ),
            },
        }
        if let Some(backup) = &o.backup {
            println!("       backup: {}", backup.display());
        }
    }
}

#[cfg(test)]
#[path = "migrate_test.rs"]
mod tests;
