//! Live table description.
//!
//! `EXPLAIN <table>` returns one row per column with the cells
//! `Field, Type, Null, Key, Default, Extra`. Some servers hand the
//! `Type` cell back as bytes, so every cell is decoded leniently.

use crate::builder::value::SqlValue;
use crate::error::{Result, SyncError};
use crate::executor::QueryOutput;
use crate::ident::quote_table;
use crate::schema::{ColumnDescriptor, TableSchema};

const CELLS: [&str; 6] = ["Field", "Type", "Null", "Key", "Default", "Extra"];

/// Statement describing the columns of `table`.
#[must_use]
pub fn describe_statement(table: &str) -> String {
    format!("EXPLAIN {}", quote_table(table))
}

/// Statement counting tables named `table` in the current database.
#[must_use]
pub fn table_exists_statement(table: &str) -> (String, Vec<SqlValue>) {
    (
        String::from(
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_schema = DATABASE() AND table_name = ?",
        ),
        vec![SqlValue::Text(String::from(table))],
    )
}

/// Reads the count returned by [`table_exists_statement`].
#[must_use]
pub fn parse_exists(output: &QueryOutput) -> bool {
    output
        .rows
        .first()
        .and_then(|row| row.first())
        .is_some_and(|cell| match cell {
            SqlValue::Int(n) => *n > 0,
            other => cell_text(other).is_some_and(|t| t.trim().parse::<i64>().is_ok_and(|n| n > 0)),
        })
}

/// Normalizes `EXPLAIN` rows into a [`TableSchema`].
///
/// Cells are looked up by header name, falling back to their standard
/// position. Types are upper-cased, `Null = YES` marks a nullable
/// column and `Key = PRI` the primary key.
pub fn parse_describe_rows(output: &QueryOutput) -> Result<TableSchema> {
    let index: Vec<usize> = CELLS
        .iter()
        .enumerate()
        .map(|(pos, name)| {
            output
                .columns
                .iter()
                .position(|c| c.eq_ignore_ascii_case(name))
                .unwrap_or(pos)
        })
        .collect();

    let mut schema = TableSchema::new();
    for (n, row) in output.rows.iter().enumerate() {
        let cell = |i: usize| row.get(index[i]).and_then(cell_text);

        let name = cell(0).ok_or_else(|| {
            SyncError::executor(DescribeError(format!("row {n} has no Field cell")))
        })?;
        let declared = cell(1).ok_or_else(|| {
            SyncError::executor(DescribeError(format!("column {name} has no Type cell")))
        })?;

        let column = ColumnDescriptor::live(name.clone(), &declared)
            .nullable(cell(2).is_some_and(|v| v.eq_ignore_ascii_case("YES")))
            .primary_key(cell(3).is_some_and(|v| v.eq_ignore_ascii_case("PRI")))
            .default_value(cell(4))
            .extra(cell(5).unwrap_or_default());
        schema = schema.column(column);
    }
    Ok(schema)
}

fn cell_text(value: &SqlValue) -> Option<String> {
    match value {
        SqlValue::Null => None,
        SqlValue::Blob(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        other => Some(other.to_string()),
    }
}

/// A describe result that could not be understood.
#[derive(Debug, thiserror::Error)]
#[error("unexpected EXPLAIN output: {0}")]
struct DescribeError(String);
