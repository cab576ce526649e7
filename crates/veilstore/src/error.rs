//! Error types for client operations.

use thiserror::Error;

use veilstore_core::CoreError;
use veilstore_store::StoreError;

/// Errors surfaced by client operations.
///
/// Cryptographic verification failures ([`Integrity`], [`Forged`]) are
/// terminal for the operation: no partial trust, no retry across a
/// security boundary. Because the store offers no cross-address
/// transactions, a caller that observes an error after a multi-write
/// operation should assume partial effects and re-run the whole
/// operation; every step is idempotent.
///
/// [`Integrity`]: ClientError::Integrity
/// [`Forged`]: ClientError::Forged
#[derive(Debug, Error)]
pub enum ClientError {
    /// The addressed value is absent from the untrusted store.
    #[error("not found")]
    NotFound,

    /// A MAC or ciphertext failed verification: the stored bytes are not
    /// the bytes that were written. A security event, never tolerated.
    #[error("integrity check failed")]
    Integrity,

    /// The password does not open this account.
    #[error("bad password")]
    BadPassword,

    /// The name or filename is already in use.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The directory has no keys for this account.
    #[error("no such user: {0}")]
    NoSuchUser(String),

    /// No live share connects this file to the named account: the grant
    /// never existed, or it has since been revoked.
    #[error("no live share with {0}")]
    NotShared(String),

    /// Only the owning account may revoke access.
    #[error("only the owning account may revoke access")]
    NotOwner,

    /// An invitation's signature did not verify against the sender's
    /// published key.
    #[error("invitation signature is forged or corrupted")]
    Forged,

    /// Usernames must be non-empty.
    #[error("username must not be empty")]
    InvalidUsername,

    /// A record decrypted and verified but did not decode. Indicates a
    /// version mismatch or a writer bug rather than an adversary.
    #[error("malformed record: {0}")]
    Malformed(String),

    /// The storage collaborator failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A cryptographic primitive failed outside a verification check.
    #[error("crypto error: {0}")]
    Crypto(#[from] CoreError),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
