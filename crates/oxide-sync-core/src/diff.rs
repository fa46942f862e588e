//! Schema diff engine.
//!
//! Compares an inferred schema (desired, from a dataset) against a live
//! schema (current, from the table) and reports the columns to add and
//! the columns whose base type must change. Columns that exist only in
//! the live table are left alone.

use crate::schema::{ColumnDescriptor, TableSchema};
use crate::types::base_type;

/// Result of comparing an inferred schema with a live one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDiff {
    /// Inferred columns absent from the live table.
    pub missing: Vec<ColumnDescriptor>,
    /// Names of shared columns whose base type differs.
    pub mismatched: Vec<String>,
}

impl SchemaDiff {
    /// Returns `true` when the schemas are already aligned and no ALTER
    /// statement should be issued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.mismatched.is_empty()
    }

    /// Total number of column changes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.missing.len() + self.mismatched.len()
    }
}

/// Diffs `inferred` against `live`.
///
/// Base types are compared on the token before any `(` or whitespace,
/// upper-cased, so `varchar(100)` and `VARCHAR(255)` agree while
/// `BIGINT` and `INT` do not. Results follow the inferred column order.
#[must_use]
pub fn diff(inferred: &TableSchema, live: &TableSchema) -> SchemaDiff {
    let mut missing = Vec::new();
    let mut mismatched = Vec::new();

    for column in &inferred.columns {
        match live.get_column(&column.name) {
            None => missing.push(column.clone()),
            Some(live_column) => {
                if base_type(&live_column.data_type) != base_type(&column.data_type) {
                    mismatched.push(column.name.clone());
                }
            }
        }
    }

    SchemaDiff {
        missing,
        mismatched,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RelationalType;

    fn inferred() -> TableSchema {
        TableSchema::new()
            .column(ColumnDescriptor::inferred("Name", RelationalType::Varchar, false))
            .column(ColumnDescriptor::inferred("Age", RelationalType::Float, false))
            .column(ColumnDescriptor::inferred("IsActive", RelationalType::TinyInt, false))
    }

    #[test]
    fn test_diff_identical_is_empty() {
        let schema = inferred();
        let d = diff(&schema, &schema);
        assert!(d.is_empty());
        assert_eq!(d.len(), 0);
    }

    #[test]
    fn test_diff_against_empty_live() {
        let d = diff(&inferred(), &TableSchema::new());
        let names: Vec<&str> = d.missing.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Name", "Age", "IsActive"]);
        assert!(d.mismatched.is_empty());
    }

    #[test]
    fn test_diff_detects_type_change() {
        let live = TableSchema::new()
            .column(ColumnDescriptor::live("Name", "varchar(100)"))
            .column(ColumnDescriptor::live("Age", "varchar(255)"))
            .column(ColumnDescriptor::live("IsActive", "tinyint(1)"));
        let d = diff(&inferred(), &live);
        assert!(d.missing.is_empty());
        assert_eq!(d.mismatched, vec!["Age".to_string()]);
    }

    #[test]
    fn test_live_only_columns_are_ignored() {
        let live = TableSchema::new()
            .column(ColumnDescriptor::live("id", "int(11)"))
            .column(ColumnDescriptor::live("Name", "VARCHAR(255)"))
            .column(ColumnDescriptor::live("Age", "FLOAT(10,5)"))
            .column(ColumnDescriptor::live("IsActive", "TINYINT(1)"));
        assert!(diff(&inferred(), &live).is_empty());
    }

    #[test]
    fn test_integer_width_difference_is_a_mismatch() {
        let inferred =
            TableSchema::new().column(ColumnDescriptor::inferred("n", RelationalType::Int, false));
        let live = TableSchema::new().column(ColumnDescriptor::live("n", "bigint(20)"));
        assert_eq!(diff(&inferred, &live).mismatched, vec!["n".to_string()]);
    }
}
