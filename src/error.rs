//! Store errors

use thiserror::Error;

/// Errors from item store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A mutation addressed a position outside the list.
    #[error("Invalid item index {index} (list has {len} items)")]
    InvalidIndex { index: usize, len: usize },

    /// The persisted value is not a list of `{name, done}` objects.
    #[error("Malformed persisted state: {0}")]
    MalformedState(#[source] serde_json::Error),

    /// The item list could not be encoded.
    #[error("Serialization error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The storage backend rejected a read or write.
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
