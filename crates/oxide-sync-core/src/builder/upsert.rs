//! MySQL UPSERT (INSERT ... ON DUPLICATE KEY UPDATE) builder.

use std::marker::PhantomData;

use super::sanitized_columns;
use super::value::SqlValue;
use crate::error::{Result, SyncError};
use crate::ident::{quote_table, sanitize};
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
/// Marker: No key columns specified yet.
pub struct NoKeys;
/// Marker: Key columns have been specified.
pub struct HasKeys;

/// An UPSERT builder: inserts a record, updating every non-key column
/// when a row with the same key already exists.
pub struct Upsert<Table, Values, Keys> {
    table: Option<String>,
    record: RowRecord,
    keys: Vec<String>,
    _state: PhantomData<(Table, Values, Keys)>,
}

impl Upsert<NoTable, NoValues, NoKeys> {
    /// Creates a new UPSERT builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: None,
            record: RowRecord::new(),
            keys: vec![],
            _state: PhantomData,
        }
    }
}

impl Default for Upsert<NoTable, NoValues, NoKeys> {
    fn default() -> Self {
        Self::new()
    }
}

// Transition: NoTable -> HasTable
impl<Values, Keys> Upsert<NoTable, Values, Keys> {
    /// Specifies the table to insert into.
    #[must_use]
    pub fn into_table(self, table: &str) -> Upsert<HasTable, Values, Keys> {
        Upsert {
            table: Some(String::from(table)),
            record: self.record,
            keys: self.keys,
            _state: PhantomData,
        }
    }
}

// Transition: NoValues -> HasValues
impl<Keys> Upsert<HasTable, NoValues, Keys> {
    /// Sets the record to insert.
    #[must_use]
    pub fn row(self, record: &RowRecord) -> Upsert<HasTable, HasValues, Keys> {
        Upsert {
            table: self.table,
            record: record.clone(),
            keys: self.keys,
            _state: PhantomData,
        }
    }
}

// Transition: NoKeys -> HasKeys
impl Upsert<HasTable, HasValues, NoKeys> {
    /// Names the key columns. They are matched against the record's
    /// sanitized column names, exactly, never by substring.
    #[must_use]
    pub fn on_duplicate_key(self, keys: &[&str]) -> Upsert<HasTable, HasValues, HasKeys> {
        Upsert {
            table: self.table,
            record: self.record,
            keys: keys.iter().map(|k| sanitize(k)).collect(),
            _state: PhantomData,
        }
    }
}

impl Upsert<HasTable, HasValues, HasKeys> {
    /// Builds the statement. Values are the full insert values followed
    /// by the update values of the non-key columns.
    pub fn build(self) -> Result<(String, Vec<SqlValue>)> {
        let columns = sanitized_columns(&self.record)?;

        let mut sql = String::from("INSERT INTO ");
        let mut params: Vec<SqlValue> = self.record.values().cloned().collect();

        if let Some(ref table) = self.table {
            sql.push_str(&quote_table(table));
        }

        sql.push_str(" (");
        sql.push_str(&columns.join(", "));
        sql.push_str(") VALUES (");
        let placeholders: Vec<&str> = columns.iter().map(|_| SqlValue::placeholder()).collect();
        sql.push_str(&placeholders.join(", "));
        sql.push(')');

        let updates: Vec<(&String, &SqlValue)> = columns
            .iter()
            .zip(self.record.values())
            .filter(|(column, _)| !self.keys.contains(column))
            .collect();

        if updates.is_empty() {
            return Err(SyncError::malformed(
                "upsert needs at least one non-key column to update",
            ));
        }

        sql.push_str(" ON DUPLICATE KEY UPDATE ");
        let assignments: Vec<String> = updates.iter().map(|(c, _)| format!("{c} = ?")).collect();
        sql.push_str(&assignments.join(", "));
        params.extend(updates.into_iter().map(|(_, v)| v.clone()));

        Ok((sql, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_single_key() {
        let (sql, params) = Upsert::new()
            .into_table("users")
            .row(&RowRecord::new().with("id", 1_i64).with("name", "x"))
            .on_duplicate_key(&["id"])
            .build()
            .unwrap();

        assert_eq!(
            sql,
            "INSERT INTO `users` (id, name) VALUES (?, ?) ON DUPLICATE KEY UPDATE name = ?"
        );
        assert_eq!(
            params,
            vec![
                SqlValue::Int(1),
                SqlValue::Text("x".into()),
                SqlValue::Text("x".into())
            ]
        );
    }

    #[test]
    fn test_upsert_key_is_not_a_substring_match() {
        // "id" must not swallow "userid" or "idx".
        let (sql, params) = Upsert::new()
            .into_table("t")
            .row(
                &RowRecord::new()
                    .with("id", 1_i64)
                    .with("user_id", 2_i64)
                    .with("idx", 3_i64),
            )
            .on_duplicate_key(&["id"])
            .build()
            .unwrap();

        assert!(sql.ends_with("ON DUPLICATE KEY UPDATE userid = ?, idx = ?"));
        assert_eq!(params.len(), 5);
    }

    #[test]
    fn test_upsert_composite_key() {
        let (sql, params) = Upsert::new()
            .into_table("scores")
            .row(
                &RowRecord::new()
                    .with("player", "bob")
                    .with("game", 7_i64)
                    .with("score", 10_i64),
            )
            .on_duplicate_key(&["player", "game"])
            .build()
            .unwrap();

        assert_eq!(
            sql,
            "INSERT INTO `scores` (player, game, score) VALUES (?, ?, ?) \
             ON DUPLICATE KEY UPDATE score = ?"
        );
        assert_eq!(params.len(), 4);
        assert_eq!(params[3], SqlValue::Int(10));
    }

    #[test]
    fn test_upsert_all_keys_is_malformed() {
        let err = Upsert::new()
            .into_table("t")
            .row(&RowRecord::new().with("id", 1_i64))
            .on_duplicate_key(&["id"])
            .build()
            .unwrap_err();

        assert!(matches!(err, SyncError::MalformedStatement(_)));
    }
}
