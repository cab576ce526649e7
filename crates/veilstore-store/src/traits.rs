//! Collaborator traits: the untrusted store and the key directory.
//!
//! Both are async so network-backed implementations can slot in without
//! touching the protocol layer; only single-operation atomicity is
//! offered, never transactions spanning addresses.

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;

use veilstore_core::Address;

use crate::error::Result;

/// The untrusted key-value backing service.
///
/// Available but fully adversarial: values may be read, substituted, or
/// deleted out from under the caller at any time. Nothing stored here is
/// trusted until it passes cryptographic verification upstream.
#[async_trait]
pub trait UntrustedStore: Send + Sync {
    /// Write a value, unconditionally replacing any previous one.
    async fn put(&self, address: Address, value: Bytes) -> Result<()>;

    /// Read a value; `Ok(None)` when the address holds nothing.
    async fn get(&self, address: &Address) -> Result<Option<Bytes>>;

    /// Remove a value. Removing an absent address is a no-op.
    async fn delete(&self, address: &Address) -> Result<()>;
}

/// A 32-byte public key published in the directory.
///
/// Both Ed25519 verifying keys and X25519 public keys fit this shape;
/// the name under which a key is registered tells callers which it is.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DirectoryKey(pub [u8; 32]);

impl DirectoryKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for DirectoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DirectoryKey(..)")
    }
}

/// The public-key directory.
///
/// Names are stable per account (one suffix per key kind); registration
/// is first-come, first-served and doubles as the account existence
/// check.
#[async_trait]
pub trait KeyDirectory: Send + Sync {
    /// Publish a key under a name; fails with [`StoreError::NameTaken`]
    /// if the name is already in use.
    ///
    /// [`StoreError::NameTaken`]: crate::error::StoreError::NameTaken
    async fn register(&self, name: &str, key: DirectoryKey) -> Result<()>;

    /// Look up a published key; `Ok(None)` when the name is unknown.
    async fn lookup(&self, name: &str) -> Result<Option<DirectoryKey>>;
}
