//! Table rebuilds for schema edits SQLite cannot make with `ALTER TABLE`.
//!
//! Changing a column's type or nullability, dropping or reordering columns,
//! or changing several of these at once all go through the same sequence:
//!
//! 1. rename the table to a temporary name
//! 2. create the table again under its original name with the new definition
//! 3. copy rows across with an explicit column list
//! 4. drop the temporary table
//! 5. re-create every index the table had
//!
//! SQLite moves indexes along with a renamed table and drops them with it, so
//! an index left out of step 5 silently disappears. [`TableRebuild`] makes the
//! column list and the index list part of the declaration and refuses to build
//! a rebuild that copies with `*`.
//!
//! The emitted statements form a single [`Change`], so they share the
//! ChangeSet transaction: if the copy violates a new constraint (a NULL going
//! into a `NOT NULL` column, say) the whole ChangeSet rolls back.
//!
//! A rebuilt table must not be the target of foreign keys, views or triggers:
//! SQLite rewrites those to follow the rename and they would be left pointing
//! at the dropped temporary table.

use crate::change::Change;
use crate::error::CatalogError;

/// Declarative description of one table rebuild.
///
/// ```
/// use cim_migrate::TableRebuild;
///
/// let change = TableRebuild::new("meters")
///     .create("CREATE TABLE meters (mrid TEXT NOT NULL, reading INTEGER NULL)")
///     .copy(&["mrid"])
///     .copy_as("reading", "CAST(reading AS INTEGER)")
///     .index("CREATE UNIQUE INDEX meters_mrid ON meters (mrid)")
///     .into_change()
///     .unwrap();
/// assert_eq!(change.statements().len(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct TableRebuild {
    table: String,
    temp_table: String,
    create_sql: Option<String>,
    columns: Vec<ColumnCopy>,
    indexes: Vec<String>,
}

#[derive(Debug, Clone)]
struct ColumnCopy {
    target: String,
    source: String,
}

impl TableRebuild {
    /// Start a rebuild of `table`. The temporary name defaults to `<table>_old`.
    pub fn new(table: impl Into<String>) -> Self {
        let table = table.into();
        let temp_table = format!("{table}_old");
        Self {
            table,
            temp_table,
            create_sql: None,
            columns: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Override the temporary table name.
    pub fn temp_name(mut self, name: impl Into<String>) -> Self {
        self.temp_table = name.into();
        self
    }

    /// The `CREATE TABLE` statement for the new definition.
    pub fn create(mut self, sql: impl Into<String>) -> Self {
        self.create_sql = Some(sql.into());
        self
    }

    /// Copy columns whose name and value carry over unchanged.
    pub fn copy(mut self, columns: &[&str]) -> Self {
        self.columns.extend(columns.iter().map(|c| ColumnCopy {
            target: (*c).to_string(),
            source: (*c).to_string(),
        }));
        self
    }

    /// Fill `column` from an expression over the old table: a cast, a
    /// renamed source column, a constant for a column that did not exist.
    pub fn copy_as(mut self, column: impl Into<String>, expression: impl Into<String>) -> Self {
        self.columns.push(ColumnCopy {
            target: column.into(),
            source: expression.into(),
        });
        self
    }

    /// An index to re-create once the new table is populated.
    pub fn index(mut self, sql: impl Into<String>) -> Self {
        self.indexes.push(sql.into());
        self
    }

    /// Check the declaration and emit the statements in execution order.
    pub fn into_statements(self) -> Result<Vec<String>, CatalogError> {
        self.validate()?;
        let TableRebuild {
            table,
            temp_table,
            create_sql,
            columns,
            indexes,
        } = self;
        let Some(create_sql) = create_sql else {
            // validate() rejects a missing definition.
            return Err(invalid(&table, "missing CREATE TABLE statement"));
        };

        let targets = columns
            .iter()
            .map(|c| c.target.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let sources = columns
            .iter()
            .map(|c| c.source.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let mut statements = Vec::with_capacity(4 + indexes.len());
        statements.push(format!("ALTER TABLE {table} RENAME TO {temp_table}"));
        statements.push(create_sql);
        statements.push(format!(
            "INSERT INTO {table} ({targets}) SELECT {sources} FROM {temp_table}"
        ));
        statements.push(format!("DROP TABLE {temp_table}"));
        statements.extend(indexes);
        Ok(statements)
    }

    /// Build the rebuild as a [`Change`] that applies to every kind; restrict
    /// it with [`Change::only`].
    pub fn into_change(self) -> Result<Change, CatalogError> {
        Ok(Change::new(self.into_statements()?))
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let table = self.table.as_str();
        if table.trim().is_empty() {
            return Err(invalid(table, "table name is empty"));
        }
        if self.temp_table.eq_ignore_ascii_case(table) {
            return Err(invalid(table, "temporary name equals the table name"));
        }

        match &self.create_sql {
            None => return Err(invalid(table, "missing CREATE TABLE statement")),
            Some(sql) if !defines_table(&normalize(sql), &lower(table)) => {
                return Err(invalid(
                    table,
                    "definition must be a CREATE TABLE for the rebuilt table",
                ));
            }
            Some(_) => {}
        }

        if self.columns.is_empty() {
            return Err(invalid(table, "no columns to copy"));
        }
        let mut seen = std::collections::HashSet::new();
        for column in &self.columns {
            if column.target.contains('*') || is_wildcard(&column.source) {
                return Err(invalid(table, "column list must be explicit, not '*'"));
            }
            if column.source.trim().is_empty() {
                return Err(invalid(
                    table,
                    &format!("empty expression for column '{}'", column.target),
                ));
            }
            if !seen.insert(lower(&column.target)) {
                return Err(invalid(
                    table,
                    &format!("column '{}' is copied twice", column.target),
                ));
            }
        }

        for index in &self.indexes {
            let sql = normalize(index);
            let is_index =
                sql.starts_with("create index ") || sql.starts_with("create unique index ");
            if !is_index || !targets_table(&sql, &lower(table)) {
                return Err(invalid(
                    table,
                    &format!("'{index}' does not create an index on the rebuilt table"),
                ));
            }
        }
        Ok(())
    }
}

fn invalid(table: &str, reason: &str) -> CatalogError {
    CatalogError::InvalidRebuild {
        table: table.to_string(),
        reason: reason.to_string(),
    }
}

fn lower(s: &str) -> String {
    s.trim().to_ascii_lowercase()
}

/// Lower-case with all whitespace runs collapsed to one space.
fn normalize(sql: &str) -> String {
    sql.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

fn is_wildcard(expression: &str) -> bool {
    let e = expression.trim();
    e == "*" || e.ends_with(".*")
}

/// Whether a normalized statement is `CREATE TABLE <table> (...)`.
fn defines_table(sql: &str, table: &str) -> bool {
    sql.strip_prefix("create table ")
        .is_some_and(|rest| names_table(rest, table))
}

/// Whether a normalized `CREATE INDEX` statement is `... ON <table> (...)`.
fn targets_table(sql: &str, table: &str) -> bool {
    let Some(pos) = sql.find(" on ") else {
        return false;
    };
    names_table(&sql[pos + 4..], table)
}

fn names_table(rest: &str, table: &str) -> bool {
    rest.strip_prefix(table)
        .is_some_and(|after| after.starts_with('(') || after.starts_with(' '))
}

#[cfg(test)]
#[path = "rebuild_test.rs"]
mod tests;
