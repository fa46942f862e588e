//! ALTER TABLE synthesis from a schema diff.

use super::check_column_names;
use crate::diff::SchemaDiff;
use crate::error::Result;
use crate::ident::quote_table;
use crate::schema::TableSchema;

/// Builds a single `ALTER TABLE` reconciling a live table with an
/// inferred schema.
///
/// Missing columns become `ADD COLUMN c TYPE NULL` and mismatched ones
/// `CHANGE COLUMN c c TYPE NULL`, all joined with commas. Reconciled
/// columns are always nullable so existing rows stay valid.
#[derive(Debug, Clone)]
pub struct AlterTable {
    table: String,
    columns: Vec<String>,
    clauses: Vec<String>,
}

impl AlterTable {
    /// Starts an ALTER TABLE for `table`.
    #[must_use]
    pub fn new(table: &str) -> Self {
        Self {
            table: String::from(table),
            columns: vec![],
            clauses: vec![],
        }
    }

    /// Adds the clauses for `diff`. Target types of mismatched columns
    /// are looked up in `inferred`; names it does not know are skipped.
    #[must_use]
    pub fn diff(mut self, diff: &SchemaDiff, inferred: &TableSchema) -> Self {
        for column in &diff.missing {
            self.columns.push(column.name.clone());
            self.clauses
                .push(format!("ADD COLUMN {} {} NULL", column.name, column.column_type));
        }
        for name in &diff.mismatched {
            if let Some(column) = inferred.get_column(name) {
                self.columns.push(name.clone());
                self.clauses.push(format!(
                    "CHANGE COLUMN {name} {name} {} NULL",
                    column.column_type
                ));
            }
        }
        self
    }

    /// Returns `true` if there is nothing to alter.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Builds the statement, or `None` when there is nothing to alter.
    ///
    /// Fails with [`SyncError::MalformedStatement`] when a touched column
    /// name is empty or repeated.
    ///
    /// [`SyncError::MalformedStatement`]: crate::error::SyncError::MalformedStatement
    pub fn build(self) -> Result<Option<String>> {
        if self.clauses.is_empty() {
            return Ok(None);
        }
        check_column_names(self.columns.iter().map(String::as_str))?;
        Ok(Some(format!(
            "ALTER TABLE {} {}",
            quote_table(&self.table),
            self.clauses.join(", ")
        )))
    }
}
