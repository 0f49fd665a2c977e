//! Storage failures.

use thiserror::Error;

/// Errors raised by a storage medium.
///
/// Parse failures of stored content are not errors: `get` maps them to
/// absence.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        StorageError::Unavailable(msg.into())
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
