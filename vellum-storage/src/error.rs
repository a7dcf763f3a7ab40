//! Error types for the storage layer.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error (file system).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An update targeted a row that does not exist.
    #[error("no {table} row with id {id}")]
    RowNotFound { table: &'static str, id: i64 },

    /// An update or delete was requested for a record that was never inserted.
    #[error("{0} has not been persisted")]
    NotPersisted(&'static str),

    /// A stored value could not be decoded.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A previous holder of the connection panicked.
    #[error("database connection lock poisoned")]
    LockPoisoned,
}
