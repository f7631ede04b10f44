//! Storage error types for timeline-storage.
//!
//! [`StorageError`] is the persistence-failure class of the engine. The
//! best-effort half of [`HistoryPersistence`](crate::HistoryPersistence)
//! logs and swallows it; the `try_*` half hands it back to the caller.

use thiserror::Error;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The SQLite backend reported an error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Applying schema migrations failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// A filesystem operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The key cannot be used with this backend.
    #[error("invalid storage key: '{key}'")]
    InvalidKey { key: String },

    /// A stored graph parsed but violates the tree invariants.
    #[error("corrupt history: {reason}")]
    Corrupt { reason: String },
}
