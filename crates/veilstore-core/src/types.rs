//! Storage addressing and hash-chain types.
//!
//! All identifiers are newtypes to prevent misuse at compile time.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 16-byte location in the untrusted store.
///
/// Addresses are either the first 16 bytes of a hash output (deterministic
/// locations such as account and file records, chain positions) or random
/// (capability cells, invitation tokens).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(pub [u8; 16]);

impl Address {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Draw a fresh random address.
    pub fn random() -> Self {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 16]> for Address {
    fn from(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

/// A 64-byte hash-chain value (blake3 XOF output).
///
/// Chain position `n` of a log is `hashⁿ(seed)`; the digest's first 16
/// bytes are its storage address.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDigest(#[serde(with = "crate::serde64")] pub [u8; 64]);

impl ChainDigest {
    /// Hash arbitrary bytes down to a chain digest.
    pub fn hash(data: &[u8]) -> Self {
        let mut out = [0u8; 64];
        let mut hasher = blake3::Hasher::new();
        hasher.update(data);
        hasher.finalize_xof().fill(&mut out);
        Self(out)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// The next position in the chain.
    pub fn next(&self) -> Self {
        Self::hash(&self.0)
    }

    /// The storage address of this position.
    pub fn address(&self) -> Address {
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&self.0[..16]);
        Address(bytes)
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for ChainDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainDigest({})", &self.to_hex()[..16])
    }
}

impl TryFrom<&[u8]> for ChainDigest {
    type Error = std::array::TryFromSliceError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; 64] = slice.try_into()?;
        Ok(Self(arr))
    }
}

/// A random 64-byte seed anchoring one content log.
///
/// The log's frontier marker lives at the seed's own address; block `n`
/// lives at the address of the n-th iterated hash of the seed.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSeed(#[serde(with = "crate::serde64")] pub [u8; 64]);

impl ChainSeed {
    /// Draw a fresh random seed.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 64];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// The first chain position, `hash(seed)`.
    pub fn first_link(&self) -> ChainDigest {
        ChainDigest::hash(&self.0)
    }

    /// The storage address of the frontier marker.
    pub fn address(&self) -> Address {
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&self.0[..16]);
        Address(bytes)
    }
}

impl fmt::Debug for ChainSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainSeed({})", &hex::encode(self.0)[..16])
    }
}
