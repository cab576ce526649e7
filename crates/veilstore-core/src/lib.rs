//! # veilstore core
//!
//! Pure cryptographic primitives for veilstore: hashing and addressing,
//! symmetric keys, signing, key agreement, and password-based derivation.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over cryptographic data structures.
//!
//! ## Key Types
//!
//! - [`Address`] - 16-byte location in the untrusted store
//! - [`ChainDigest`] / [`ChainSeed`] - 64-byte hash-chain values
//! - [`SymmetricKey`] - 32-byte key with independent encryption/MAC subkeys
//! - [`SigningKeypair`] - Ed25519 identity for signing invitations
//! - [`ExchangeSecret`] / [`SealedBox`] - X25519 key agreement and ECIES

pub mod crypto;
pub mod error;
pub mod exchange;
pub mod kdf;
pub mod sign;
pub mod types;

pub(crate) mod serde64;

pub use crypto::{EncryptionNonce, MacTag, SymmetricKey};
pub use error::{CoreError, Result};
pub use exchange::{EphemeralExchange, ExchangePublicKey, ExchangeSecret, SealedBox, SharedKey};
pub use kdf::derive_master_key;
pub use sign::{Signature, SigningKeypair, VerifyingKey};
pub use types::{Address, ChainDigest, ChainSeed};
