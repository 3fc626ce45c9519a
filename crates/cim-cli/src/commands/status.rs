//! Status command implementation

use anyhow::{Context, Result};
use cim_migrate::{builtin_catalog, DatabaseKind, MigrationPlan, MigrationRunner};
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::{GlobalArgs, OutputFormat, StatusArgs};
use crate::commands::common::{resolve_targets, version_label, ExitCode};
use crate::config::DatabaseEntry;

/// Read-only view of one database.
#[derive(Debug, Serialize)]
pub(crate) struct DatabaseStatus {
    pub path: PathBuf,
    pub kind: DatabaseKind,
    /// Whether the file exists yet
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<MigrationPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Execute the status command
pub(crate) async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let targets = resolve_targets(&args.target, global)?;
    let statuses: Vec<DatabaseStatus> = targets.databases.iter().map(database_status).collect();

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&statuses)?),
        OutputFormat::Text => print_statuses(&statuses),
    }

    if statuses.iter().any(|s| s.error.is_some()) {
        return Err(ExitCode(1).into());
    }
    Ok(())
}

/// Plan a migration of `entry` without writing to it.
///
/// A missing file is planned as an empty database and is not created.
pub(crate) fn database_status(entry: &DatabaseEntry) -> DatabaseStatus {
    let exists = entry.path.exists();
    let (plan, error) = match plan(entry, exists) {
        Ok(plan) => (Some(plan), None),
        Err(e) => (None, Some(format!("{e:#}"))),
    };
    DatabaseStatus {
        path: entry.path.clone(),
        kind: entry.kind,
        exists,
        plan,
        error,
    }
}

fn plan(entry: &DatabaseEntry, exists: bool) -> Result<MigrationPlan> {
    let catalog = builtin_catalog().context("Compiled-in ChangeSet catalog is invalid")?;
    let conn = if exists {
        Connection::open_with_flags(&entry.path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("Failed to open {}", entry.path.display()))?
    } else {
        Connection::open_in_memory()?
    };
    let plan = MigrationRunner::new(catalog)
        .plan(&conn, entry.kind)
        .with_context(|| format!("Failed to read {}", entry.path.display()))?;
    Ok(plan)
}

fn print_statuses(statuses: &[DatabaseStatus]) {
    for s in statuses {
        let label = format!("{} ({})", s.path.display(), s.kind);
        if let Some(error) = &s.error {
            println!("  ERROR   {label}: {error}");
            continue;
        }
        let Some(plan) = &s.plan else { continue };

        let state = if !s.exists {
            "MISSING"
        } else if plan.is_up_to_date() {
            "CURRENT"
        } else {
            "PENDING"
        };
        let ids: Vec<String> = plan.pending.iter().map(|p| p.id.to_string()).collect();
        if ids.is_empty() {
            println!(
                "  {state:<7} {label}: version {}",
                version_label(plan.current_version)
            );
        } else {
            println!(
                "  {state:<7} {label}: version {}, {} pending [{}]",
                version_label(plan.current_version),
                ids.len(),
                ids.join(", ")
            );
        }
    }
}
