//! Ordered row records.
//!
//! A [`RowRecord`] maps column names to values while keeping insertion
//! order. The order decides how placeholders line up with bound values
//! in every synthesized statement.

use crate::builder::value::{SqlValue, ToSqlValue};

/// One row to insert or update, keyed by column name in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowRecord {
    entries: Vec<(String, SqlValue)>,
}

impl RowRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column, builder style.
    #[must_use]
    pub fn with<T: ToSqlValue>(mut self, column: impl Into<String>, value: T) -> Self {
        self.insert(column, value);
        self
    }

    /// Sets a column. An existing column keeps its position and gets
    /// the new value.
    pub fn insert<T: ToSqlValue>(&mut self, column: impl Into<String>, value: T) {
        let column = column.into();
        let value = value.to_sql_value();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
    }

    /// Returns the value for `column`.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v)
    }

    /// Column names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Values in order.
    pub fn values(&self) -> impl Iterator<Item = &SqlValue> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// `(column, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries.iter().map(|(name, v)| (name.as_str(), v))
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the record has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `other` has the same keys in the same order.
    #[must_use]
    pub fn same_keys(&self, other: &Self) -> bool {
        self.keys().eq(other.keys())
    }
}

impl<K: Into<String>> FromIterator<(K, SqlValue)> for RowRecord {
    fn from_iter<I: IntoIterator<Item = (K, SqlValue)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl IntoIterator for RowRecord {
    type Item = (String, SqlValue);
    type IntoIter = std::vec::IntoIter<(String, SqlValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_is_kept() {
        let record = RowRecord::new().with("b", 1_i64).with("a", 2_i64);
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn test_reinsert_keeps_position() {
        let mut record = RowRecord::new().with("id", 1_i64).with("name", "x");
        record.insert("id", 7_i64);
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["id", "name"]);
        assert_eq!(record.get("id"), Some(&SqlValue::Int(7)));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_same_keys_is_order_sensitive() {
        let a = RowRecord::new().with("x", 1_i64).with("y", 2_i64);
        let b = RowRecord::new().with("y", 2_i64).with("x", 1_i64);
        assert!(!a.same_keys(&b));
        assert!(a.same_keys(&a.clone()));
    }
}
