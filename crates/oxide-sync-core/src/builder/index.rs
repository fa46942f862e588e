//! Secondary index statements.

use crate::error::{Result, SyncError};
use crate::ident::{quote_table, sanitize};

/// `ALTER TABLE t ADD INDEX name (a, b)`.
#[derive(Debug, Clone)]
pub struct CreateIndex {
    table: String,
    name: String,
    fields: Vec<String>,
}

impl CreateIndex {
    /// Starts an index named `name` on `table`.
    #[must_use]
    pub fn new(table: &str, name: &str) -> Self {
        Self {
            table: String::from(table),
            name: sanitize(name),
            fields: vec![],
        }
    }

    /// Sets the indexed columns, in order.
    #[must_use]
    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|f| sanitize(f)).collect();
        self
    }

    /// Builds the statement.
    pub fn build(self) -> Result<String> {
        if self.name.is_empty() {
            return Err(SyncError::malformed("index name is empty"));
        }
        if self.fields.is_empty() || self.fields.iter().any(String::is_empty) {
            return Err(SyncError::malformed(format!(
                "index {} needs at least one named column",
                self.name
            )));
        }
        Ok(format!(
            "ALTER TABLE {} ADD INDEX {} ({})",
            quote_table(&self.table),
            self.name,
            self.fields.join(", ")
        ))
    }
}

/// `ALTER TABLE t DROP INDEX name`.
#[derive(Debug, Clone)]
pub struct DropIndex {
    table: String,
    name: String,
}

impl DropIndex {
    /// Drops the index `name` from `table`.
    #[must_use]
    pub fn new(table: &str, name: &str) -> Self {
        Self {
            table: String::from(table),
            name: sanitize(name),
        }
    }

    /// Builds the statement.
    pub fn build(self) -> Result<String> {
        if self.name.is_empty() {
            return Err(SyncError::malformed("index name is empty"));
        }
        Ok(format!(
            "ALTER TABLE {} DROP INDEX {}",
            quote_table(&self.table),
            self.name
        ))
    }
}
