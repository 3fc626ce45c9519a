//! Validate command implementation

use anyhow::Result;
use cim_migrate::changesets;
use cim_migrate::{CatalogError, ChangeSetCatalog};

use crate::cli::{GlobalArgs, ValidateArgs};
use crate::commands::common::{config_path, ExitCode};
use crate::config::Config;

/// Execute the validate command
pub(crate) async fn execute(args: &ValidateArgs, global: &GlobalArgs) -> Result<()> {
    let mut failed = false;

    match validate_catalog() {
        Ok(catalog) => println!(
            "Catalog OK: {} ChangeSet(s), latest version {}",
            catalog.len(),
            catalog.latest()
        ),
        Err(e) => {
            eprintln!("Catalog invalid: {e}");
            failed = true;
        }
    }

    if !args.catalog_only {
        // The default file is optional; an explicit --config must exist.
        let path = config_path(global);
        if global.config.is_some() || path.exists() {
            match Config::load(&path) {
                Ok(config) => println!(
                    "Config OK: {} ({} database(s))",
                    path.display(),
                    config.databases.len()
                ),
                Err(e) => {
                    eprintln!("Config invalid: {e}");
                    failed = true;
                }
            }
        }
    }

    if failed {
        return Err(ExitCode(1).into());
    }
    Ok(())
}

/// Build the compiled-in history from scratch and check it.
fn validate_catalog() -> Result<ChangeSetCatalog, CatalogError> {
    ChangeSetCatalog::new(changesets::all()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiled_in_catalog_is_valid() {
        let catalog = validate_catalog().unwrap();
        assert!(!catalog.is_empty());
    }

    #[tokio::test]
    async fn explicit_missing_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        let global = GlobalArgs {
            verbose: false,
            config: Some(dir.path().join("cimdb.yml")),
        };
        let err = execute(&ValidateArgs { catalog_only: false }, &global)
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<ExitCode>().is_some());
    }

    #[tokio::test]
    async fn catalog_only_ignores_config() {
        let dir = tempfile::tempdir().unwrap();
        let global = GlobalArgs {
            verbose: false,
            config: Some(dir.path().join("cimdb.yml")),
        };
        execute(&ValidateArgs { catalog_only: true }, &global)
            .await
            .unwrap();
    }
}
