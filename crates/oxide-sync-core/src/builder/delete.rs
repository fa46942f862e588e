//! DELETE statement builder using the typestate pattern.

use std::marker::PhantomData;

use super::clause::WhereClause;
use super::value::SqlValue;
use crate::error::Result;
use crate::ident::quote_table;

// Typestate markers

/// Marker: No table specified yet.
pub struct NoTable;
/// Marker: Table has been specified.
pub struct HasTable;

/// A DELETE statement builder.
pub struct Delete<Table> {
    table: Option<String>,
    where_clause: Option<WhereClause>,
    _state: PhantomData<Table>,
}

impl Delete<NoTable> {
    /// Creates a new DELETE builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            table: None,
            where_clause: None,
            _state: PhantomData,
        }
    }

    /// Specifies the table to delete from.
    #[must_use]
    pub fn from(self, table: &str) -> Delete<HasTable> {
        Delete {
            table: Some(String::from(table)),
            where_clause: self.where_clause,
            _state: PhantomData,
        }
    }
}

impl Default for Delete<NoTable> {
    fn default() -> Self {
        Self::new()
    }
}

impl Delete<HasTable> {
    /// Adds a WHERE clause. Without one every row is deleted.
    #[must_use]
    pub fn where_clause(mut self, clause: WhereClause) -> Self {
        self.where_clause = Some(clause);
        self
    }

    /// Builds the DELETE statement and returns SQL with parameters.
    pub fn build(self) -> Result<(String, Vec<SqlValue>)> {
        let mut sql = String::from("DELETE FROM ");
        let mut params = vec![];

        if let Some(ref table) = self.table {
            sql.push_str(&quote_table(table));
        }

        if let Some(ref where_clause) = self.where_clause {
            where_clause.validate()?;
            sql.push_str(" WHERE ");
            sql.push_str(where_clause.sql());
            params.extend(where_clause.params().iter().cloned());
        }

        Ok((sql, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_with_where() {
        let (sql, params) = Delete::new()
            .from("users")
            .where_clause(WhereClause::new("id = ?", vec![42_i64]))
            .build()
            .unwrap();

        assert_eq!(sql, "DELETE FROM `users` WHERE id = ?");
        assert_eq!(params, vec![SqlValue::Int(42)]);
    }

    #[test]
    fn test_delete_all() {
        let (sql, params) = Delete::new().from("users").build().unwrap();
        assert_eq!(sql, "DELETE FROM `users`");
        assert!(params.is_empty());
    }
}
