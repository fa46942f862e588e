//! UPDATE statement builder using the typestate pattern.

use std::marker::PhantomData;

use super::clause::WhereClause;
use super::sanitized_columns;
use super::value::SqlValue;
use crate::error::{Result, SyncError};
use crate::ident::quote_table;
use crate::record::RowRecord;

// Typestate markers

/// Marker: No table specified yet.
pub struct NoTable;
/// Marker: Table has been specified.
pub struct HasTable;
/// Marker: No SET clause specified yet.
pub struct NoSet;
/// Marker: SET clause has been specified.
pub struct HasSet;

/// An UPDATE statement builder driven by a record.
pub struct Update<Table, Set> {
    table: Option<String>,
    record: RowRecord,
    where_clause: Option<WhereClause>,
    _state: PhantomData<(Table, Set)>,
}

impl Update<NoTable, NoSet> {
    /// Creates a new UPDATE builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: None,
            record: RowRecord::new(),
            where_clause: None,
            _state: PhantomData,
        }
    }
}

impl Default for Update<NoTable, NoSet> {
    fn default() -> Self {
        Self::new()
    }
}

// Transition: NoTable -> HasTable
impl<Set> Update<NoTable, Set> {
    /// Specifies the table to update.
    #[must_use]
    pub fn table(self, table: &str) -> Update<HasTable, Set> {
        Update {
            table: Some(String::from(table)),
            record: self.record,
            where_clause: self.where_clause,
            _state: PhantomData,
        }
    }
}

// Transition: NoSet -> HasSet (requires table)
impl Update<HasTable, NoSet> {
    /// Sets every column of `record`, in record order.
    #[must_use]
    pub fn set_record(self, record: &RowRecord) -> Update<HasTable, HasSet> {
        Update {
            table: self.table,
            record: record.clone(),
            where_clause: self.where_clause,
            _state: PhantomData,
        }
    }
}

// Methods available after SET
impl Update<HasTable, HasSet> {
    /// Adds a WHERE clause. Its values are bound after the SET values.
    #[must_use]
    pub fn where_clause(mut self, clause: WhereClause) -> Self {
        self.where_clause = Some(clause);
        self
    }

    /// Builds the UPDATE statement and returns SQL with parameters.
    pub fn build(self) -> Result<(String, Vec<SqlValue>)> {
        let columns = sanitized_columns(&self.record)?;
        if columns.is_empty() {
            return Err(SyncError::malformed("update needs at least one column to set"));
        }

        let mut sql = String::from("UPDATE ");
        let mut params: Vec<SqlValue> = self.record.values().cloned().collect();

        if let Some(ref table) = self.table {
            sql.push_str(&quote_table(table));
        }

        sql.push_str(" SET ");

        let set_parts: Vec<String> = columns.iter().map(|c| format!("{c} = ?")).collect();
        sql.push_str(&set_parts.join(", "));

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
    fn test_simple_update() {
        let (sql, params) = Update::new()
            .table("users")
            .set_record(&RowRecord::new().with("name", "Bob"))
            .build()
            .unwrap();

        assert_eq!(sql, "UPDATE `users` SET name = ?");
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_update_with_where_orders_params() {
        let (sql, params) = Update::new()
            .table("users")
            .set_record(&RowRecord::new().with("name", "Bob").with("age", 30_i32))
            .where_clause(WhereClause::new("id = ?", vec![7_i64]))
            .build()
            .unwrap();

        assert_eq!(sql, "UPDATE `users` SET name = ?, age = ? WHERE id = ?");
        assert_eq!(
            params,
            vec![
                SqlValue::Text("Bob".into()),
                SqlValue::Int(30),
                SqlValue::Int(7)
            ]
        );
    }

    #[test]
    fn test_update_without_columns_is_malformed() {
        let err = Update::new()
            .table("t")
            .set_record(&RowRecord::new())
            .build()
            .unwrap_err();

        assert!(matches!(err, SyncError::MalformedStatement(_)));
    }

    #[test]
    fn test_update_rejects_placeholder_mismatch() {
        let err = Update::new()
            .table("users")
            .set_record(&RowRecord::new().with("name", "Bob"))
            .where_clause(WhereClause::new("id = ? OR id = ?", vec![1_i64]))
            .build()
            .unwrap_err();

        assert!(matches!(err, SyncError::MalformedStatement(_)));
    }

    #[test]
    fn test_update_sql_injection_prevention() {
        let malicious = "'; DROP TABLE users; --";
        let (sql, params) = Update::new()
            .table("users")
            .set_record(&RowRecord::new().with("name", malicious))
            .where_clause(WhereClause::new("id = ?", vec![1_i32]))
            .build()
            .unwrap();

        assert_eq!(sql, "UPDATE `users` SET name = ? WHERE id = ?");
        assert!(matches!(&params[0], SqlValue::Text(s) if s == malicious));
    }
}
