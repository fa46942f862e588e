//! Schema reconciliation and statement synthesis between tabular
//! datasets and MySQL-family tables.
//!
//! `oxide-sync-core` is driver-agnostic. It:
//! - Infers a relational column type for every dataset column
//!   (including JSON sniffing of text columns)
//! - Diffs the inferred schema against a live table and emits the
//!   minimal `ALTER TABLE` to reconcile them
//! - Synthesizes parameterized INSERT, batch INSERT, UPDATE, UPSERT,
//!   DELETE, SELECT and LEFT JOIN statements with sanitized column names
//!
//! Statements run through the synchronous [`QueryExecutor`] trait.
//! Driver crates (oxide-sync-mysql, etc.) implement it.
//!
//! # Architecture
//!
//! - **types** - Value tags and relational types, plus inference
//! - **schema** / **diff** - Column descriptors and the diff engine
//! - **builder** - Typestate statement builders
//! - **sync** - [`TableSync`], which drives create/alter/load cycles
//!
//! # Example
//!
//! ```rust
//! use oxide_sync_core::prelude::*;
//!
//! let players = Frame::new()
//!     .column("Name", ValueTypeTag::Text, vec![SqlValue::Text("Bob".into())])
//!     .column("Age", ValueTypeTag::Float64, vec![SqlValue::Float(25.0)])
//!     .column("Is_Active", ValueTypeTag::Boolean, vec![SqlValue::Bool(true)]);
//!
//! let schema = TableSchema::infer(&players, None);
//! let sql = CreateTable::new("players").columns(&schema).build().unwrap();
//! assert_eq!(
//!     sql,
//!     "CREATE TABLE `players` (id INT NOT NULL PRIMARY KEY, Name VARCHAR(255) NULL, \
//!      Age FLOAT(10,5) NULL, IsActive TINYINT(1) NULL)"
//! );
//! ```

pub mod builder;
pub mod dataset;
pub mod describe;
pub mod diff;
pub mod error;
pub mod executor;
pub mod ident;
pub mod record;
pub mod schema;
pub mod sync;
pub mod types;

pub use builder::value::{SqlValue, ToSqlValue};
pub use dataset::{ColumnRef, Dataset, Frame, FrameColumn};
pub use diff::{SchemaDiff, diff};
pub use error::{Result, SyncError};
pub use executor::{QueryExecutor, QueryOutput};
pub use record::RowRecord;
pub use schema::{ColumnDescriptor, TableSchema};
pub use sync::{DEFAULT_BATCH_SIZE, TableSync};
pub use types::{RelationalType, ValueTypeTag, infer_column, infer_type};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::builder::{
        AlterTable, CreateIndex, CreateTable, Delete, Direction, DropIndex, Insert, LeftJoin,
        Limit, OrderBy, Select, Update, Upsert, WhereClause,
    };
    pub use crate::builder::value::{SqlValue, ToSqlValue};
    pub use crate::dataset::{Dataset, Frame};
    pub use crate::diff::{SchemaDiff, diff};
    pub use crate::error::{Result, SyncError};
    pub use crate::executor::{QueryExecutor, QueryOutput};
    pub use crate::ident::sanitize;
    pub use crate::record::RowRecord;
    pub use crate::schema::{ColumnDescriptor, TableSchema};
    pub use crate::sync::TableSync;
    pub use crate::types::{RelationalType, ValueTypeTag, infer_type};
}
