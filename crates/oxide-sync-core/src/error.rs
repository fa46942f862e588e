//! Error types for schema sync and statement synthesis.

use thiserror::Error;

/// Errors surfaced by the sync engine and its executors.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The connection to the server dropped. The statement boundary
    /// reconnects and retries once before surfacing this.
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// The referenced table does not exist.
    #[error("table not found: {0}")]
    SchemaNotFound(String),

    /// A builder precondition was violated (empty batch, mismatched
    /// record keys, placeholder/value count mismatch, ...).
    #[error("malformed statement: {0}")]
    MalformedStatement(String),

    /// Any other failure reported by the executor.
    #[error("executor error: {0}")]
    Executor(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl SyncError {
    /// Creates a [`SyncError::MalformedStatement`].
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedStatement(message.into())
    }

    /// Wraps an arbitrary driver error as [`SyncError::Executor`].
    pub fn executor<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Executor(Box::new(err))
    }

    /// Returns `true` if a reconnect-and-retry may succeed.
    #[must_use]
    pub const fn is_connection_lost(&self) -> bool {
        matches!(self, Self::ConnectionLost(_))
    }
}

/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
