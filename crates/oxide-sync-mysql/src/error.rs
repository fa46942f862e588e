//! Error types for the MySQL driver and its tooling.

use std::path::PathBuf;

use oxide_sync_core::SyncError;
use sqlx::mysql::MySqlDatabaseError;

/// MySQL server error numbers that mean the session is gone.
const CONNECTION_GONE: [u16; 2] = [
    1927, // ER_CONNECTION_KILLED
    4031, // ER_CLIENT_INTERACTION_TIMEOUT
];

/// `ER_NO_SUCH_TABLE`.
const NO_SUCH_TABLE: u16 = 1146;

/// Errors that can occur while setting up or driving a MySQL sync.
#[derive(Debug, thiserror::Error)]
pub enum MySqlSyncError {
    /// Database error outside of statement execution (connecting, ...).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A sync operation failed.
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// IO error (reading CSV or configuration files, starting the runtime).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV input.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed configuration file.
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// A CSV file without a header row.
    #[error("CSV file has no header row: {0}")]
    MissingHeader(PathBuf),
}

/// Result type for the MySQL driver.
pub type Result<T> = std::result::Result<T, MySqlSyncError>;

/// Maps a driver error onto the sync error taxonomy.
///
/// Transport failures become [`SyncError::ConnectionLost`] so the
/// statement boundary can reconnect; a missing table becomes
/// [`SyncError::SchemaNotFound`]. Everything else is wrapped unchanged.
pub fn map_sqlx_error(err: sqlx::Error) -> SyncError {
    let server_error = match &err {
        sqlx::Error::Database(db) => db
            .try_downcast_ref::<MySqlDatabaseError>()
            .map(|e| (e.number(), e.message().to_string())),
        _ => None,
    };

    match (err, server_error) {
        (sqlx::Error::Io(e), _) => SyncError::ConnectionLost(e.to_string()),
        (e @ (sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed), _) => {
            SyncError::ConnectionLost(e.to_string())
        }
        (_, Some((NO_SUCH_TABLE, message))) => SyncError::SchemaNotFound(message),
        (_, Some((number, message))) if CONNECTION_GONE.contains(&number) => {
            SyncError::ConnectionLost(message)
        }
        (e, _) => SyncError::executor(e),
    }
}
