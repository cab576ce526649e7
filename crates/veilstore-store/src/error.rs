//! Error types for the storage collaborators.

use thiserror::Error;

/// Errors from the untrusted store or the key directory.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The directory already holds a key under this name.
    #[error("directory name already taken: {0}")]
    NameTaken(String),

    /// The backend failed to service the request.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;
