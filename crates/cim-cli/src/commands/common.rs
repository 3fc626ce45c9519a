//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use std::fmt;
use std::path::PathBuf;

use crate::cli::{GlobalArgs, TargetArgs};
use crate::config::{Config, DatabaseEntry, DEFAULT_CONFIG_FILE};

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that destructors run and open databases are closed cleanly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) u8);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; the command has already reported the failure.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Databases a command operates on.
#[derive(Debug)]
pub(crate) struct Targets {
    pub databases: Vec<DatabaseEntry>,
    pub backup_dir: Option<PathBuf>,
}

/// Config file path from `--config`, or cimdb.yml in the working directory.
pub(crate) fn config_path(global: &GlobalArgs) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Use the database named on the command line, or every database in the
/// config file.
pub(crate) fn resolve_targets(target: &TargetArgs, global: &GlobalArgs) -> Result<Targets> {
    if let (Some(path), Some(kind)) = (&target.database, target.kind) {
        return Ok(Targets {
            databases: vec![DatabaseEntry {
                path: path.clone(),
                kind,
            }],
            backup_dir: None,
        });
    }

    let path = config_path(global);
    let config =
        Config::load(&path).with_context(|| format!("Failed to load {}", path.display()))?;
    log::debug!(
        "Loaded {} database(s) from {}",
        config.databases.len(),
        path.display()
    );
    Ok(Targets {
        databases: config.databases,
        backup_dir: config.backup_dir,
    })
}

/// Render an optional schema version.
pub(crate) fn version_label(version: Option<u32>) -> String {
    version.map_or_else(|| "none".to_string(), |v| v.to_string())
}
