//! Error types for veilstore-core.

use thiserror::Error;

/// Errors from primitive cryptographic operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A ciphertext or MAC failed authentication.
    #[error("ciphertext failed authentication")]
    Authentication,

    /// A public key could not be parsed.
    #[error("invalid public key")]
    InvalidPublicKey,

    /// A signature did not verify.
    #[error("invalid signature")]
    InvalidSignature,

    /// Password-based key derivation failed.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),
}

/// Result type for primitive operations.
pub type Result<T> = std::result::Result<T, CoreError>;
