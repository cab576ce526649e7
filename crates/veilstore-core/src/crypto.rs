//! Symmetric cryptography: AEAD encryption and keyed MACs.
//!
//! A [`SymmetricKey`] never touches a cipher directly. Two independent
//! subkeys are derived from it with distinct blake3 contexts, one for
//! ChaCha20-Poly1305 and one for the keyed MAC, so the same 32 bytes can
//! safely drive both primitives.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};

const ENCRYPTION_CONTEXT: &str = "veilstore v1 envelope encryption";
const AUTHENTICATION_CONTEXT: &str = "veilstore v1 envelope authentication";

/// A 256-bit symmetric key.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymmetricKey([u8; 32]);

impl SymmetricKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    fn encryption_subkey(&self) -> [u8; 32] {
        blake3::derive_key(ENCRYPTION_CONTEXT, &self.0)
    }

    fn authentication_subkey(&self) -> [u8; 32] {
        blake3::derive_key(AUTHENTICATION_CONTEXT, &self.0)
    }

    /// Encrypt under the encryption subkey.
    pub fn encrypt(&self, plaintext: &[u8], nonce: &EncryptionNonce) -> Result<Vec<u8>> {
        let cipher = ChaCha20Poly1305::new_from_slice(&self.encryption_subkey())
            .map_err(|e| CoreError::Encryption(e.to_string()))?;

        cipher
            .encrypt(Nonce::from_slice(&nonce.0), plaintext)
            .map_err(|e| CoreError::Encryption(e.to_string()))
    }

    /// Decrypt under the encryption subkey.
    pub fn decrypt(&self, ciphertext: &[u8], nonce: &EncryptionNonce) -> Result<Vec<u8>> {
        let cipher = ChaCha20Poly1305::new_from_slice(&self.encryption_subkey())
            .map_err(|e| CoreError::Encryption(e.to_string()))?;

        cipher
            .decrypt(Nonce::from_slice(&nonce.0), ciphertext)
            .map_err(|_| CoreError::Authentication)
    }

    /// Compute the keyed MAC of `data` under the authentication subkey.
    pub fn mac(&self, data: &[u8]) -> MacTag {
        MacTag(*blake3::keyed_hash(&self.authentication_subkey(), data).as_bytes())
    }

    /// Verify a MAC in constant time.
    pub fn verify_mac(&self, data: &[u8], tag: &MacTag) -> Result<()> {
        let computed = blake3::keyed_hash(&self.authentication_subkey(), data);
        // blake3::Hash equality is constant-time
        if computed == blake3::Hash::from(tag.0) {
            Ok(())
        } else {
            Err(CoreError::Authentication)
        }
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // never print key material
        write!(f, "SymmetricKey(..)")
    }
}

/// A 256-bit keyed-hash authenticator over a ciphertext.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacTag(pub [u8; 32]);

impl MacTag {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for MacTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacTag({})", &hex::encode(self.0)[..16])
    }
}

/// A 96-bit nonce for ChaCha20-Poly1305.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionNonce(pub [u8; 12]);

impl EncryptionNonce {
    /// Generate a new random nonce.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 12];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }
}

/// Derive a fresh 64-byte state from key material, bound to `context`.
///
/// Used by the key ratchet: the output is unpredictable without the input
/// material yet deterministically re-derivable by anyone holding it.
pub fn derive_state(context: &str, material: &[u8]) -> [u8; 64] {
    let mut out = [0u8; 64];
    let mut hasher = blake3::Hasher::new_derive_key(context);
    hasher.update(material);
    hasher.finalize_xof().fill(&mut out);
    out
}
