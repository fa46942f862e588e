//! Column descriptors for inferred and live schemas.
//!
//! The same [`ColumnDescriptor`] shape comes out of type inference (from
//! a dataset) and out of describing a live table, so both sides can be
//! diffed directly.

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::ident::sanitize;
use crate::types::{RelationalType, base_type, infer_column};

/// A column definition, either inferred or described.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name (sanitized for inferred columns).
    pub name: String,
    /// Upper-cased base type, e.g. `VARCHAR`.
    pub data_type: String,
    /// Upper-cased full type, e.g. `VARCHAR(255)`.
    pub column_type: String,
    /// Whether the column allows NULL values.
    pub nullable: bool,
    /// Whether the column is the primary key.
    pub primary_key: bool,
    /// Default value as reported by the server.
    pub default: Option<String>,
    /// Extra attributes (e.g. `auto_increment`).
    pub extra: String,
}

impl ColumnDescriptor {
    /// Creates an inferred column. Key columns are `NOT NULL`.
    #[must_use]
    pub fn inferred(name: &str, relational: RelationalType, primary_key: bool) -> Self {
        Self {
            name: sanitize(name),
            data_type: relational.base_name().to_string(),
            column_type: relational.sql(),
            nullable: !primary_key,
            primary_key,
            default: None,
            extra: String::new(),
        }
    }

    /// Creates a descriptor from a live column's declared type.
    #[must_use]
    pub fn live(name: impl Into<String>, declared_type: &str) -> Self {
        let column_type = declared_type.trim().to_ascii_uppercase();
        Self {
            name: name.into(),
            data_type: base_type(&column_type),
            column_type,
            nullable: true,
            primary_key: false,
            default: None,
            extra: String::new(),
        }
    }

    /// Sets nullability.
    #[must_use]
    pub const fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Marks the column as primary key.
    #[must_use]
    pub const fn primary_key(mut self, primary_key: bool) -> Self {
        self.primary_key = primary_key;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, default: Option<String>) -> Self {
        self.default = default;
        self
    }

    /// Sets the extra attributes.
    #[must_use]
    pub fn extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = extra.into();
        self
    }

    /// Returns the type clause used in CREATE TABLE, e.g.
    /// `FLOAT(10,5) NULL` or `INT NOT NULL PRIMARY KEY`.
    #[must_use]
    pub fn definition(&self) -> String {
        if self.primary_key {
            format!("{} NOT NULL PRIMARY KEY", self.column_type)
        } else if self.nullable {
            format!("{} NULL", self.column_type)
        } else {
            format!("{} NOT NULL", self.column_type)
        }
    }

    /// Compares name and base type, the fields both inference and
    /// description agree on.
    #[must_use]
    pub fn same_shape(&self, other: &Self) -> bool {
        self.name == other.name && self.data_type == other.data_type
    }
}

/// The ordered columns of a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Column definitions in table order.
    pub columns: Vec<ColumnDescriptor>,
}

impl TableSchema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, column: ColumnDescriptor) -> Self {
        self.columns.push(column);
        self
    }

    /// Infers a schema from a dataset. The first column whose sanitized
    /// name equals the sanitized `key_field` becomes the primary key.
    #[must_use]
    pub fn infer(dataset: &dyn Dataset, key_field: Option<&str>) -> Self {
        let key = key_field.map(sanitize);
        let mut key_taken = false;
        let columns = dataset
            .columns()
            .iter()
            .map(|column| {
                let is_key = !key_taken && key.as_deref() == Some(sanitize(column.name).as_str());
                key_taken |= is_key;
                ColumnDescriptor::inferred(column.name, infer_column(column), is_key)
            })
            .collect();
        Self { columns }
    }

    /// Gets a column by name.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns `true` if a column with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    /// Returns the column names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Returns the primary key column, if any.
    #[must_use]
    pub fn primary_key(&self) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.primary_key)
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the schema has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::value::SqlValue;
    use crate::dataset::Frame;
    use crate::types::ValueTypeTag;

    fn players() -> Frame {
        Frame::new()
            .column("Name", ValueTypeTag::Text, vec![SqlValue::Text("Bob".into())])
            .column("Age", ValueTypeTag::Float64, vec![SqlValue::Float(25.0)])
            .column("Is_Active", ValueTypeTag::Boolean, vec![SqlValue::Bool(true)])
    }

    #[test]
    fn test_infer_schema() {
        let schema = TableSchema::infer(&players(), None);
        let defs: Vec<(String, String)> = schema
            .columns
            .iter()
            .map(|c| (c.name.clone(), c.definition()))
            .collect();
        assert_eq!(
            defs,
            vec![
                ("Name".to_string(), "VARCHAR(255) NULL".to_string()),
                ("Age".to_string(), "FLOAT(10,5) NULL".to_string()),
                ("IsActive".to_string(), "TINYINT(1) NULL".to_string()),
            ]
        );
        assert!(schema.primary_key().is_none());
    }

    #[test]
    fn test_infer_schema_with_key() {
        let schema = TableSchema::infer(&players(), Some("Name"));
        let pk = schema.primary_key().unwrap();
        assert_eq!(pk.name, "Name");
        assert_eq!(pk.definition(), "VARCHAR(255) NOT NULL PRIMARY KEY");
        assert_eq!(schema.columns.iter().filter(|c| c.primary_key).count(), 1);
    }

    #[test]
    fn test_key_matches_sanitized_name() {
        let schema = TableSchema::infer(&players(), Some("IsActive"));
        assert_eq!(schema.primary_key().unwrap().name, "IsActive");
    }

    #[test]
    fn test_only_one_primary_key() {
        // Both columns sanitize to "ab".
        let frame = Frame::new()
            .column("a_b", ValueTypeTag::Int64, vec![SqlValue::Int(1)])
            .column("a-b", ValueTypeTag::Int64, vec![SqlValue::Int(2)]);
        let schema = TableSchema::infer(&frame, Some("ab"));
        assert_eq!(schema.columns.iter().filter(|c| c.primary_key).count(), 1);
        assert!(schema.columns[0].primary_key);
    }

    #[test]
    fn test_live_descriptor() {
        let col = ColumnDescriptor::live("Age", "varchar(255)");
        assert_eq!(col.data_type, "VARCHAR");
        assert_eq!(col.column_type, "VARCHAR(255)");
        assert!(col.same_shape(&ColumnDescriptor::inferred(
            "Age",
            RelationalType::Varchar,
            false
        )));
    }
}
