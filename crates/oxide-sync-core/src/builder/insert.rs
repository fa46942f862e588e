//! INSERT statement builder using the typestate pattern.
//!
//! Columns and values come from [`RowRecord`]s: placeholders are emitted
//! in record key order and values are bound in the same order.

use std::marker::PhantomData;

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
/// Marker: No values specified yet.
pub struct NoValues;
/// Marker: Values have been specified.
pub struct HasValues;

/// An INSERT statement builder for one or many records.
pub struct Insert<Table, Values> {
    table: Option<String>,
    columns: Vec<String>,
    keys: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
    problem: Option<String>,
    _state: PhantomData<(Table, Values)>,
}

impl Insert<NoTable, NoValues> {
    /// Creates a new INSERT builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: None,
            columns: vec![],
            keys: vec![],
            rows: vec![],
            problem: None,
            _state: PhantomData,
        }
    }
}

impl Default for Insert<NoTable, NoValues> {
    fn default() -> Self {
        Self::new()
    }
}

// Transition: NoTable -> HasTable
impl<Values> Insert<NoTable, Values> {
    /// Specifies the table to insert into.
    #[must_use]
    pub fn into_table(self, table: &str) -> Insert<HasTable, Values> {
        Insert {
            table: Some(String::from(table)),
            columns: self.columns,
            keys: self.keys,
            rows: self.rows,
            problem: self.problem,
            _state: PhantomData,
        }
    }
}

// Transition: NoValues -> HasValues
impl Insert<HasTable, NoValues> {
    /// Inserts a single record.
    #[must_use]
    pub fn row(self, record: &RowRecord) -> Insert<HasTable, HasValues> {
        self.rows(std::slice::from_ref(record))
    }

    /// Inserts many records in one statement.
    ///
    /// Every record must carry the same keys in the same order as the
    /// first one; `build()` reports a malformed statement otherwise.
    #[must_use]
    pub fn rows(self, records: &[RowRecord]) -> Insert<HasTable, HasValues> {
        let mut next = Insert {
            table: self.table,
            columns: vec![],
            keys: vec![],
            rows: vec![],
            problem: None,
            _state: PhantomData,
        };
        match records.first() {
            None => next.problem = Some(String::from("batch insert needs at least one record")),
            Some(first) => {
                next.keys = first.keys().map(String::from).collect();
                match sanitized_columns(first) {
                    Ok(columns) => next.columns = columns,
                    Err(e) => next.problem = Some(e.to_string()),
                }
                for record in records {
                    next = next.and_row(record);
                }
            }
        }
        next
    }
}

// Methods available after adding values
impl Insert<HasTable, HasValues> {
    /// Adds another record. Its keys must match the first record's.
    #[must_use]
    pub fn and_row(mut self, record: &RowRecord) -> Self {
        if self.problem.is_none() && !record.keys().eq(self.keys.iter().map(String::as_str)) {
            self.problem = Some(format!(
                "record {} has keys [{}], expected [{}]",
                self.rows.len(),
                record.keys().collect::<Vec<_>>().join(", "),
                self.keys.join(", ")
            ));
        }
        self.rows.push(record.values().cloned().collect());
        self
    }

    /// Builds the INSERT statement and returns SQL with parameters.
    pub fn build(self) -> Result<(String, Vec<SqlValue>)> {
        if let Some(problem) = self.problem {
            return Err(SyncError::MalformedStatement(problem));
        }

        let mut sql = String::from("INSERT INTO ");
        let mut params = vec![];

        if let Some(ref table) = self.table {
            sql.push_str(&quote_table(table));
        }

        sql.push_str(" (");
        sql.push_str(&self.columns.join(", "));
        sql.push(')');

        sql.push_str(" VALUES ");

        let row_strs: Vec<String> = self
            .rows
            .iter()
            .map(|row| {
                let placeholders: Vec<&str> = row.iter().map(|_| SqlValue::placeholder()).collect();
                format!("({})", placeholders.join(", "))
            })
            .collect();

        sql.push_str(&row_strs.join(", "));

        for row in self.rows {
            params.extend(row);
        }

        Ok((sql, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::value::ToSqlValue;

    fn record(id: i64, name: &str) -> RowRecord {
        RowRecord::new().with("id", id).with("name", name)
    }

    #[test]
    fn test_simple_insert() {
        let (sql, params) = Insert::new()
            .into_table("users")
            .row(&RowRecord::new().with("name", "Alice").with("email", "alice@example.com"))
            .build()
            .unwrap();

        assert_eq!(sql, "INSERT INTO `users` (name, email) VALUES (?, ?)");
        assert_eq!(
            params,
            vec!["Alice".to_sql_value(), "alice@example.com".to_sql_value()]
        );
    }

    #[test]
    fn test_insert_sanitizes_columns() {
        let (sql, _) = Insert::new()
            .into_table("export_log")
            .row(&RowRecord::new().with("user_id", 1_i64).with("Is Active", true))
            .build()
            .unwrap();

        assert_eq!(sql, "INSERT INTO `export_log` (userid, IsActive) VALUES (?, ?)");
    }

    #[test]
    fn test_batch_insert() {
        let (sql, params) = Insert::new()
            .into_table("users")
            .rows(&[record(1, "a"), record(2, "b"), record(3, "c")])
            .build()
            .unwrap();

        assert_eq!(
            sql,
            "INSERT INTO `users` (id, name) VALUES (?, ?), (?, ?), (?, ?)"
        );
        assert_eq!(
            params,
            vec![
                SqlValue::Int(1),
                "a".to_sql_value(),
                SqlValue::Int(2),
                "b".to_sql_value(),
                SqlValue::Int(3),
                "c".to_sql_value(),
            ]
        );
    }

    #[test]
    fn test_batch_insert_rejects_reordered_keys() {
        let swapped = RowRecord::new().with("name", "b").with("id", 2_i64);
        let err = Insert::new()
            .into_table("users")
            .rows(&[record(1, "a"), swapped])
            .build()
            .unwrap_err();

        assert!(matches!(err, SyncError::MalformedStatement(_)));
    }

    #[test]
    fn test_batch_insert_rejects_missing_keys() {
        let short = RowRecord::new().with("id", 2_i64);
        let err = Insert::new()
            .into_table("users")
            .row(&record(1, "a"))
            .and_row(&short)
            .build()
            .unwrap_err();

        assert!(matches!(err, SyncError::MalformedStatement(_)));
    }

    #[test]
    fn test_empty_batch_is_malformed() {
        let err = Insert::new().into_table("users").rows(&[]).build().unwrap_err();
        assert!(matches!(err, SyncError::MalformedStatement(_)));
    }

    #[test]
    fn test_insert_sql_injection_prevention() {
        let malicious = "'; DROP TABLE users; --";
        let (sql, params) = Insert::new()
            .into_table("users")
            .row(&RowRecord::new().with("name", malicious))
            .build()
            .unwrap();

        assert_eq!(sql, "INSERT INTO `users` (name) VALUES (?)");
        assert!(matches!(&params[0], SqlValue::Text(s) if s == malicious));
    }
}
