//! Configuration types and parsing for cimdb.yml

use cim_migrate::DatabaseKind;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "cimdb.yml";

/// Errors raised while loading cimdb.yml
#[derive(Error, Debug)]
pub(crate) enum ConfigError {
    #[error("[E001] Config file not found: {path}")]
    NotFound { path: String },

    #[error("[E002] Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("[E003] Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("[E004] Invalid config: {message}")]
    Invalid { message: String },
}

/// The databases cimdb manages, from cimdb.yml
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    /// Where `migrate` copies each database before changing it
    #[serde(default)]
    pub backup_dir: Option<PathBuf>,

    /// Database files and their kinds
    pub databases: Vec<DatabaseEntry>,
}

/// One database file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct DatabaseEntry {
    pub path: PathBuf,
    pub kind: DatabaseKind,
}

impl Config {
    /// Load configuration from a file path.
    ///
    /// Relative paths in the file are resolved against the file's directory.
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Self::parse(&content, base)
    }

    /// Parse configuration text, resolving relative paths against `base`.
    pub(crate) fn parse(content: &str, base: &Path) -> Result<Self, ConfigError> {
        let mut config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        config.resolve(base);
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.databases.is_empty() {
            return Err(ConfigError::Invalid {
                message: "At least one database must be listed".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for db in &self.databases {
            if db.path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid {
                    message: format!("Empty path for {} database", db.kind),
                });
            }
            if !seen.insert(&db.path) {
                return Err(ConfigError::Invalid {
                    message: format!("Database '{}' is listed twice", db.path.display()),
                });
            }
        }
        Ok(())
    }

    fn resolve(&mut self, base: &Path) {
        for db in &mut self.databases {
            if db.path.is_relative() {
                db.path = base.join(&db.path);
            }
        }
        if let Some(dir) = &mut self.backup_dir {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
