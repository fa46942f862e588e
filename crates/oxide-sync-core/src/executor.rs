//! Statement execution trait.
//!
//! Driver crates (oxide-sync-mysql, etc.) implement [`QueryExecutor`]
//! to run statements against a live server. The core crate defines only
//! the trait so it stays driver-agnostic and synchronous.

use crate::builder::value::SqlValue;
use crate::error::Result;
use crate::record::RowRecord;

/// Everything a statement returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutput {
    /// Rows changed by a DML statement.
    pub rows_affected: u64,
    /// Auto-increment id generated by an INSERT, if any.
    pub last_insert_id: Option<u64>,
    /// Result column names, in order.
    pub columns: Vec<String>,
    /// Result rows, one value per column.
    pub rows: Vec<Vec<SqlValue>>,
}

impl QueryOutput {
    /// An output for a statement that changed `rows_affected` rows.
    #[must_use]
    pub fn affected(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            ..Self::default()
        }
    }

    /// An output carrying a result set.
    #[must_use]
    pub fn rows(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self {
            columns,
            rows,
            ..Self::default()
        }
    }

    /// Returns the index of `column` in the result set.
    #[must_use]
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Turns the result rows into records keyed by column name.
    #[must_use]
    pub fn records(&self) -> Vec<RowRecord> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(c, v)| (c.as_str(), v.clone()))
                    .collect()
            })
            .collect()
    }
}

/// Runs SQL against a live connection.
///
/// Implementations must report a dropped connection as
/// [`SyncError::ConnectionLost`](crate::SyncError::ConnectionLost) and an
/// unknown table as
/// [`SyncError::SchemaNotFound`](crate::SyncError::SchemaNotFound).
pub trait QueryExecutor {
    /// Executes one statement with its bound values.
    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<QueryOutput>;

    /// Re-establishes the connection after it was lost.
    fn reconnect(&mut self) -> Result<()>;

    /// Commits the current transaction.
    fn commit(&mut self) -> Result<()>;

    /// Returns `true` while the connection is usable.
    fn is_open(&self) -> bool;

    /// Closes the connection. Later calls fail until `reconnect`.
    fn close(&mut self) -> Result<()>;
}
