//! CREATE TABLE synthesis from column descriptors.

use super::check_column_names;
use crate::error::{Result, SyncError};
use crate::ident::{quote_table, sanitize};
use crate::schema::{ColumnDescriptor, TableSchema};

/// Name of the column injected when no key field is designated.
pub const SYNTHETIC_KEY: &str = "id";

/// Builds a `CREATE TABLE` statement.
///
/// With a key field, that column is declared `NOT NULL PRIMARY KEY` and
/// every other column `NULL`. Without one, a leading
/// `id INT NOT NULL PRIMARY KEY` column is injected.
#[derive(Debug, Clone)]
pub struct CreateTable {
    table: String,
    columns: Vec<ColumnDescriptor>,
    key_field: Option<String>,
}

impl CreateTable {
    /// Starts a CREATE TABLE for `table`.
    #[must_use]
    pub fn new(table: &str) -> Self {
        Self {
            table: String::from(table),
            columns: vec![],
            key_field: None,
        }
    }

    /// Sets the columns from a schema, in schema order.
    #[must_use]
    pub fn columns(mut self, schema: &TableSchema) -> Self {
        self.columns.clone_from(&schema.columns);
        self
    }

    /// Designates the primary key column by (unsanitized) name.
    #[must_use]
    pub fn key_field(mut self, key_field: Option<&str>) -> Self {
        self.key_field = key_field.map(sanitize);
        self
    }

    /// Builds the statement.
    ///
    /// Fails with [`SyncError::MalformedStatement`] when there are no
    /// columns, when a column name is empty or repeated, when the key
    /// field names no column, or when a dataset column would clash with
    /// the injected `id` column.
    pub fn build(self) -> Result<String> {
        if self.columns.is_empty() {
            return Err(SyncError::malformed(format!(
                "table {} has no columns to create",
                self.table
            )));
        }

        check_column_names(self.columns.iter().map(|c| c.name.as_str()))?;

        let mut definitions = Vec::with_capacity(self.columns.len() + 1);

        match self.key_field {
            Some(ref key) => {
                if !self.columns.iter().any(|c| c.name == *key) {
                    return Err(SyncError::malformed(format!(
                        "key field {key} is not a column of {}",
                        self.table
                    )));
                }
            }
            None => {
                if self.columns.iter().any(|c| c.name == SYNTHETIC_KEY) {
                    return Err(SyncError::malformed(format!(
                        "column {SYNTHETIC_KEY} clashes with the injected key; designate it as the key field"
                    )));
                }
                definitions.push(format!("{SYNTHETIC_KEY} INT NOT NULL PRIMARY KEY"));
            }
        }

        for column in self.columns {
            let is_key = self.key_field.as_deref() == Some(column.name.as_str());
            let column = column.primary_key(is_key).nullable(!is_key);
            definitions.push(format!("{} {}", column.name, column.definition()));
        }

        Ok(format!(
            "CREATE TABLE {} ({})",
            quote_table(&self.table),
            definitions.join(", ")
        ))
    }
}
