//! Persistence errors.

/// Errors raised by session storage and shadow-store backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No record exists for the given id.
    #[error("not found: {0}")]
    NotFound(String),
    /// A filesystem operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization of a persisted document failed.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// The checkpoint id did not match any checkpoint on the session.
    #[error("no such checkpoint: {0}")]
    UnknownCheckpoint(String),
}
