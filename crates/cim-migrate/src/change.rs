//! Changes and ChangeSets: the data the migration history is made of.

use crate::kind::DatabaseKind;
use std::collections::BTreeSet;

/// An ordered group of statements that always run together, optionally
/// restricted to some database kinds.
///
/// Statement text is opaque to the engine and is handed to SQLite verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    statements: Vec<String>,
    targets: BTreeSet<DatabaseKind>,
}

impl Change {
    /// A change that applies to every database kind.
    pub fn new<I, S>(statements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            statements: statements.into_iter().map(Into::into).collect(),
            targets: BTreeSet::new(),
        }
    }

    /// Restrict this change to `kinds`. Calling it again widens the set.
    pub fn only(mut self, kinds: &[DatabaseKind]) -> Self {
        self.targets.extend(kinds.iter().copied());
        self
    }

    /// Statements in execution order.
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Kinds this change is restricted to; empty means all kinds.
    pub fn targets(&self) -> &BTreeSet<DatabaseKind> {
        &self.targets
    }

    pub fn applies(&self, kind: DatabaseKind) -> bool {
        self.targets.is_empty() || self.targets.contains(&kind)
    }
}

/// One schema version's worth of work.
///
/// `id` is the schema version a database is at once this ChangeSet has been
/// applied. A ChangeSet that has shipped must never be edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    id: u32,
    changes: Vec<Change>,
}

impl ChangeSet {
    pub fn new(id: u32, changes: Vec<Change>) -> Self {
        Self { id, changes }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Changes that apply to `kind`, paired with their index in
    /// [`ChangeSet::changes`] so failures can point at the declared position.
    pub fn applicable(&self, kind: DatabaseKind) -> impl Iterator<Item = (usize, &Change)> {
        self.changes
            .iter()
            .enumerate()
            .filter(move |(_, change)| change.applies(kind))
    }

    /// Number of statements that would run against a database of `kind`.
    pub fn statement_count(&self, kind: DatabaseKind) -> usize {
        self.applicable(kind)
            .map(|(_, change)| change.statements().len())
            .sum()
    }
}
