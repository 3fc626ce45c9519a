//! Catalog command implementation

use anyhow::{Context, Result};
use cim_migrate::{builtin_catalog, ChangeSetCatalog, DatabaseKind};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::cli::{CatalogArgs, OutputFormat};

/// One compiled-in ChangeSet with its per-kind statement counts.
#[derive(Debug, Serialize)]
pub(crate) struct CatalogEntry {
    pub id: u32,
    pub changes: usize,
    pub statements: BTreeMap<&'static str, usize>,
}

/// Execute the catalog command
pub(crate) async fn execute(args: &CatalogArgs) -> Result<()> {
    let catalog = builtin_catalog().context("Compiled-in ChangeSet catalog is invalid")?;
    let kinds = match args.kind {
        Some(kind) => vec![kind],
        None => DatabaseKind::ALL.to_vec(),
    };
    let entries = catalog_entries(catalog, &kinds);

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Text => print_entries(&entries, &kinds),
    }
    Ok(())
}

pub(crate) fn catalog_entries(
    catalog: &ChangeSetCatalog,
    kinds: &[DatabaseKind],
) -> Vec<CatalogEntry> {
    catalog
        .iter()
        .map(|cs| CatalogEntry {
            id: cs.id(),
            changes: cs.changes().len(),
            statements: kinds
                .iter()
                .map(|&kind| (kind.as_str(), cs.statement_count(kind)))
                .collect(),
        })
        .collect()
}

fn print_entries(entries: &[CatalogEntry], kinds: &[DatabaseKind]) {
    let mut header = format!("{:>9}  {:>7}", "ChangeSet", "changes");
    for kind in kinds {
        header.push_str(&format!("  {:>13}", kind.as_str()));
    }
    println!("{header}");

    for entry in entries {
        let mut line = format!("{:>9}  {:>7}", entry.id, entry.changes);
        for kind in kinds {
            let count = entry.statements.get(kind.as_str()).copied().unwrap_or(0);
            line.push_str(&format!("  {count:>13}"));
        }
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_cover_every_changeset() {
        let catalog = builtin_catalog().unwrap();
        let entries = catalog_entries(catalog, &DatabaseKind::ALL);
        assert_eq!(entries.len(), catalog.len());
        assert_eq!(entries.last().map(|e| e.id), Some(catalog.latest()));
    }

    #[test]
    fn counts_are_per_kind() {
        let catalog = builtin_catalog().unwrap();
        let entries = catalog_entries(catalog, &[DatabaseKind::Customer]);
        let drop = &entries[3];
        assert_eq!(drop.id, 4);
        assert_eq!(drop.statements.len(), 1);
        assert_eq!(drop.statements["customer"], 3);
    }

    #[test]
    fn json_uses_kind_names() {
        let catalog = builtin_catalog().unwrap();
        let entries = catalog_entries(catalog, &DatabaseKind::ALL);
        let json = serde_json::to_value(&entries[1]).unwrap();
        assert_eq!(json["id"], 2);
        assert_eq!(json["statements"]["network_model"], 3);
        assert_eq!(json["statements"]["diagram"], 0);
    }
}
