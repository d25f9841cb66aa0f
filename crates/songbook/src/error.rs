//! Error types for songbook
//!
//! Validation rejections, storage failures, and the crate-level error that wraps both.

use thiserror::Error;

/// Why a list mutation was refused. Never leaves the list modified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejected {
    #[error("Song title is empty")]
    EmptyTitle,

    #[error("Song '{0}' already exists")]
    Duplicate(String),

    #[error("No sequential ids left")]
    IdsExhausted,
}

/// Failures talking to the key-value store
#[derive(Error, Debug)]
pub enum StorageError {
    /// The store rejected the call (permissions, missing device, I/O)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// The stored payload could not be decoded
    #[error("Stored data is corrupt: {0}")]
    Corrupt(String),

    /// The key cannot be used as a file name (only letters, digits, `-` and `_`)
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Unavailable(e.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Corrupt(e.to_string())
    }
}

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Rejected(#[from] Rejected),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Song list is not loaded yet")]
    NotReady,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to start background thread: {0}")]
    Spawn(String),
}

/// Result type alias for songbook
pub type Result<T> = std::result::Result<T, AppError>;
