//! Tabular dataset abstraction.
//!
//! The sync engine only needs to walk a dataset column by column
//! (name, type tag, values) and to turn it into row records. Any
//! container can implement [`Dataset`]; [`Frame`] is the in-memory
//! implementation used for query results and CSV imports.

use crate::builder::value::SqlValue;
use crate::record::RowRecord;
use crate::types::ValueTypeTag;

/// A borrowed view of one dataset column.
#[derive(Debug, Clone, Copy)]
pub struct ColumnRef<'a> {
    /// Column name as it appears in the dataset.
    pub name: &'a str,
    /// Runtime type tag of the column.
    pub tag: &'a ValueTypeTag,
    /// Column values in row order.
    pub values: &'a [SqlValue],
}

/// Column-wise access to a tabular dataset.
pub trait Dataset {
    /// Returns the columns in dataset order.
    fn columns(&self) -> Vec<ColumnRef<'_>>;

    /// Returns the number of rows.
    fn row_count(&self) -> usize {
        self.columns()
            .iter()
            .map(|c| c.values.len())
            .max()
            .unwrap_or(0)
    }

    /// Builds one record per row, keyed by column name in column order.
    /// Short columns are padded with NULL.
    fn records(&self) -> Vec<RowRecord> {
        let columns = self.columns();
        (0..self.row_count())
            .map(|row| {
                columns
                    .iter()
                    .map(|c| {
                        let value = c.values.get(row).cloned().unwrap_or(SqlValue::Null);
                        (c.name, value)
                    })
                    .collect()
            })
            .collect()
    }
}

/// An owned column of a [`Frame`].
#[derive(Debug, Clone, PartialEq)]
pub struct FrameColumn {
    /// Column name.
    pub name: String,
    /// Runtime type tag.
    pub tag: ValueTypeTag,
    /// Values in row order.
    pub values: Vec<SqlValue>,
}

/// A simple column-oriented in-memory dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<FrameColumn>,
}

impl Frame {
    /// Creates an empty frame.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column.
    #[must_use]
    pub fn column(
        mut self,
        name: impl Into<String>,
        tag: ValueTypeTag,
        values: Vec<SqlValue>,
    ) -> Self {
        self.push_column(FrameColumn {
            name: name.into(),
            tag,
            values,
        });
        self
    }

    /// Appends a column in place.
    pub fn push_column(&mut self, column: FrameColumn) {
        self.columns.push(column);
    }

    /// Builds a frame from result rows. Each column's tag is taken
    /// from its first non-null value; all-null columns are tagged
    /// [`ValueTypeTag::Object`].
    #[must_use]
    pub fn from_rows(column_names: &[String], rows: Vec<Vec<SqlValue>>) -> Self {
        let mut values: Vec<Vec<SqlValue>> = vec![Vec::new(); column_names.len()];
        for row in rows {
            for (i, value) in row.into_iter().enumerate().take(column_names.len()) {
                values[i].push(value);
            }
        }
        let columns = column_names
            .iter()
            .zip(values)
            .map(|(name, values)| {
                let tag = values
                    .iter()
                    .find_map(ValueTypeTag::of_value)
                    .unwrap_or(ValueTypeTag::Object);
                FrameColumn {
                    name: name.clone(),
                    tag,
                    values,
                }
            })
            .collect();
        Self { columns }
    }

    /// Returns a column by name.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&FrameColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Returns `true` if the frame has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Dataset for Frame {
    fn columns(&self) -> Vec<ColumnRef<'_>> {
        self.columns
            .iter()
            .map(|c| ColumnRef {
                name: &c.name,
                tag: &c.tag,
                values: &c.values,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players() -> Frame {
        Frame::new()
            .column(
                "Name",
                ValueTypeTag::Text,
                vec![SqlValue::Text("Bob".into()), SqlValue::Text("Ann".into())],
            )
            .column(
                "Age",
                ValueTypeTag::Float64,
                vec![SqlValue::Float(25.0), SqlValue::Null],
            )
    }

    #[test]
    fn test_records_follow_column_order() {
        let records = players().records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].keys().collect::<Vec<_>>(), vec!["Name", "Age"]);
        assert_eq!(records[1].get("Age"), Some(&SqlValue::Null));
    }

    #[test]
    fn test_short_columns_are_padded() {
        let frame = Frame::new()
            .column("a", ValueTypeTag::Int64, vec![SqlValue::Int(1), SqlValue::Int(2)])
            .column("b", ValueTypeTag::Int64, vec![SqlValue::Int(3)]);
        assert_eq!(frame.row_count(), 2);
        assert_eq!(frame.records()[1].get("b"), Some(&SqlValue::Null));
    }

    #[test]
    fn test_from_rows_derives_tags() {
        let names = vec!["id".to_string(), "note".to_string(), "flag".to_string()];
        let frame = Frame::from_rows(
            &names,
            vec![
                vec![SqlValue::Int(1), SqlValue::Null, SqlValue::Bool(true)],
                vec![SqlValue::Int(2), SqlValue::Text("x".into()), SqlValue::Bool(false)],
            ],
        );
        assert_eq!(frame.get_column("id").unwrap().tag, ValueTypeTag::Int64);
        assert_eq!(frame.get_column("note").unwrap().tag, ValueTypeTag::Object);
        assert_eq!(frame.get_column("flag").unwrap().tag, ValueTypeTag::Boolean);
        assert_eq!(frame.row_count(), 2);
    }

    #[test]
    fn test_empty_frame() {
        let frame = Frame::new();
        assert!(frame.is_empty());
        assert!(frame.records().is_empty());
    }
}
