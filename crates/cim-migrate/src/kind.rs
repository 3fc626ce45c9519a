//! The independently versioned database kinds.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which of the separately versioned database files a migration targets.
///
/// All kinds share one ChangeSet history; a [`crate::Change`] may restrict
/// itself to a subset of kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseKind {
    /// Network model: assets, equipment and connectivity
    NetworkModel,
    /// Customers, agreements and tariffs
    Customer,
    /// Diagram layouts for the network model
    Diagram,
}

impl DatabaseKind {
    /// Every kind, in declaration order.
    pub const ALL: [DatabaseKind; 3] = [
        DatabaseKind::NetworkModel,
        DatabaseKind::Customer,
        DatabaseKind::Diagram,
    ];

    /// Stable lower-case name, as used in config files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseKind::NetworkModel => "network_model",
            DatabaseKind::Customer => "customer",
            DatabaseKind::Diagram => "diagram",
        }
    }
}

impl std::fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatabaseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "network_model" | "network" => Ok(DatabaseKind::NetworkModel),
            "customer" | "customers" => Ok(DatabaseKind::Customer),
            "diagram" | "diagrams" => Ok(DatabaseKind::Diagram),
            _ => Err(format!(
                "unknown database kind '{s}' (expected network_model, customer or diagram)"
            )),
        }
    }
}
