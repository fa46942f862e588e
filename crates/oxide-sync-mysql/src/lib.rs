//! MySQL driver for `oxide-sync-core`.
//!
//! Provides [`MySqlExecutor`], a blocking [`QueryExecutor`] backed by
//! sqlx, the explicit [`ConnectionConfig`] it is opened from, and a CSV
//! loader used by the `oxide-sync` command-line tool.
//!
//! # Example
//!
//! ```rust,no_run
//! use oxide_sync_core::TableSync;
//! use oxide_sync_mysql::{ConnectionConfig, MySqlExecutor, load_csv};
//!
//! # fn main() -> oxide_sync_mysql::Result<()> {
//! let config = ConnectionConfig {
//!     user: "loader".into(),
//!     database: "sales".into(),
//!     ..ConnectionConfig::default()
//! };
//! let mut sync = TableSync::new(MySqlExecutor::connect(config)?);
//! let orders = load_csv("orders.csv".as_ref())?;
//! sync.create_or_update("orders", &orders, "order_id")?;
//! sync.commit()?;
//! # Ok(())
//! # }
//! ```
//!
//! [`QueryExecutor`]: oxide_sync_core::QueryExecutor

pub mod config;
pub mod csv_source;
pub mod error;
pub mod executor;

pub use config::ConnectionConfig;
pub use csv_source::{export_table, load_csv, read_csv, write_csv};
pub use error::{MySqlSyncError, Result, map_sqlx_error};
pub use executor::MySqlExecutor;
