//! Statement synthesis.
//!
//! Every builder returns SQL text with `?` placeholders together with
//! the values to bind, in placeholder order. Column names taken from
//! records are sanitized; table names are backtick-quoted.
//!
//! # Example
//!
//! ```rust
//! use oxide_sync_core::builder::Upsert;
//! use oxide_sync_core::builder::value::SqlValue;
//! use oxide_sync_core::RowRecord;
//!
//! let record = RowRecord::new().with("id", 1_i64).with("name", "x");
//! let (sql, params) = Upsert::new()
//!     .into_table("users")
//!     .row(&record)
//!     .on_duplicate_key(&["id"])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     sql,
//!     "INSERT INTO `users` (id, name) VALUES (?, ?) ON DUPLICATE KEY UPDATE name = ?"
//! );
//! assert_eq!(
//!     params,
//!     vec![SqlValue::Int(1), SqlValue::Text("x".into()), SqlValue::Text("x".into())]
//! );
//! ```

mod alter;
mod clause;
mod create;
mod delete;
mod index;
mod insert;
mod join;
mod select;
mod update;
mod upsert;
pub mod value;

pub use alter::AlterTable;
pub use clause::{Direction, Limit, OrderBy, WhereClause, count_placeholders, inline_params};
pub use create::CreateTable;
pub use delete::Delete;
pub use index::{CreateIndex, DropIndex};
pub use insert::Insert;
pub use join::{HasOn, LeftJoin};
pub use select::{HasColumns, HasFrom, Select};
pub use update::Update;
pub use upsert::Upsert;
pub use value::{SqlValue, ToSqlValue};

use std::collections::HashSet;

use crate::error::{Result, SyncError};
use crate::ident::sanitize;
use crate::record::RowRecord;

/// Rejects column names that are empty or repeated. Names are compared
/// as given, so callers pass them already sanitized.
pub(crate) fn check_column_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if name.is_empty() {
            return Err(SyncError::malformed(
                "column name has no alphanumeric characters",
            ));
        }
        if !seen.insert(name) {
            return Err(SyncError::malformed(format!(
                "column {name} appears more than once"
            )));
        }
    }
    Ok(())
}

/// Sanitizes a record's keys, rejecting names that end up empty or
/// collide after sanitizing.
pub(crate) fn sanitized_columns(record: &RowRecord) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    record
        .keys()
        .map(|key| {
            let column = sanitize(key);
            if column.is_empty() {
                return Err(SyncError::malformed(format!(
                    "column name {key:?} has no alphanumeric characters"
                )));
            }
            if !seen.insert(column.clone()) {
                return Err(SyncError::malformed(format!(
                    "column {key:?} collides with another column as {column:?}"
                )));
            }
            Ok(column)
        })
        .collect()
}
