//! CLI argument definitions using clap derive API

use cim_migrate::DatabaseKind;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// cimdb - versioned schema migrations for CIM databases
#[derive(Parser, Debug)]
#[command(name = "cimdb")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file listing the databases (default: cimdb.yml)
    #[arg(short, long, global = true, env = "CIMDB_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Bring databases up to the newest schema version
    Migrate(MigrateArgs),

    /// Show stored versions and pending ChangeSets without changing anything
    Status(StatusArgs),

    /// List the compiled-in ChangeSets
    Catalog(CatalogArgs),

    /// Check the compiled-in ChangeSet history (and the config file, if any)
    Validate(ValidateArgs),
}

/// Selects one database explicitly instead of reading the config file
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Database file to operate on
    #[arg(short, long, requires = "kind")]
    pub database: Option<PathBuf>,

    /// Kind of the database given with --database
    #[arg(short, long, requires = "database")]
    pub kind: Option<DatabaseKind>,
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Stop after this ChangeSet instead of the newest one
    #[arg(long, value_name = "VERSION")]
    pub to: Option<u32>,

    /// Copy each database here before changing it
    #[arg(short, long)]
    pub backup_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the catalog command
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Only count statements for this kind
    #[arg(short, long)]
    pub kind: Option<DatabaseKind>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Skip the config file even if one exists
    #[arg(long)]
    pub catalog_only: bool,
}

/// Output formats shared by the reporting commands
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
