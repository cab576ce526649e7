//! X25519 key agreement and the ECIES-style sealed box.
//!
//! An invitation is encrypted for exactly one recipient: the sender draws
//! an ephemeral keypair, agrees with the recipient's static public key,
//! derives a wrapping key bound to a context string, and encrypts with
//! ChaCha20-Poly1305. Only the recipient's static secret can open it.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use x25519_dalek::{EphemeralSecret, PublicKey, StaticSecret};

use crate::crypto::{EncryptionNonce, SymmetricKey};
use crate::error::{CoreError, Result};

/// An X25519 public key (32 bytes), as published in the key directory.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangePublicKey(pub [u8; 32]);

impl ExchangePublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    fn to_dalek(self) -> PublicKey {
        PublicKey::from(self.0)
    }
}

impl fmt::Debug for ExchangePublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExchangePublicKey({})", &hex::encode(self.0)[..16])
    }
}

/// An account's static X25519 secret for receiving invitations.
pub struct ExchangeSecret(StaticSecret);

impl ExchangeSecret {
    /// Generate a new random secret.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(StaticSecret::from(bytes))
    }

    /// Recreate from seed bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(StaticSecret::from(bytes))
    }

    /// The seed bytes (secret key material).
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Derive the public key to publish.
    pub fn public_key(&self) -> ExchangePublicKey {
        ExchangePublicKey(*PublicKey::from(&self.0).as_bytes())
    }

    /// Perform key agreement with a peer's public key.
    pub fn diffie_hellman(&self, peer: &ExchangePublicKey) -> SharedKey {
        SharedKey(*self.0.diffie_hellman(&peer.to_dalek()).as_bytes())
    }
}

/// An ephemeral keypair for one sealed box; consumed on agreement.
pub struct EphemeralExchange {
    secret: EphemeralSecret,
    public: ExchangePublicKey,
}

impl EphemeralExchange {
    /// Generate a new ephemeral keypair.
    pub fn generate() -> Self {
        let secret = EphemeralSecret::random_from_rng(rand::thread_rng());
        let public = ExchangePublicKey(*PublicKey::from(&secret).as_bytes());
        Self { secret, public }
    }

    /// Get the public half.
    pub fn public_key(&self) -> ExchangePublicKey {
        self.public
    }

    /// Perform key agreement, consuming the secret.
    pub fn diffie_hellman(self, peer: &ExchangePublicKey) -> SharedKey {
        SharedKey(*self.secret.diffie_hellman(&peer.to_dalek()).as_bytes())
    }
}

/// A shared secret from X25519 agreement.
#[derive(Clone)]
pub struct SharedKey([u8; 32]);

impl SharedKey {
    /// Derive a symmetric wrapping key bound to `context`.
    pub fn derive_wrapping_key(&self, context: &[u8]) -> SymmetricKey {
        let mut hasher = blake3::Hasher::new_derive_key("veilstore v1 exchange wrap");
        hasher.update(&self.0);
        hasher.update(context);
        SymmetricKey::from_bytes(*hasher.finalize().as_bytes())
    }
}

/// A payload encrypted for exactly one recipient.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedBox {
    /// Sender's ephemeral public key.
    pub ephemeral: ExchangePublicKey,
    /// Nonce for the wrapped ciphertext.
    pub nonce: EncryptionNonce,
    /// The encrypted payload.
    pub ciphertext: Vec<u8>,
}

impl SealedBox {
    /// Seal a payload for `recipient`, bound to `context`.
    pub fn seal(
        recipient: &ExchangePublicKey,
        plaintext: &[u8],
        context: &[u8],
    ) -> Result<Self> {
        let ephemeral = EphemeralExchange::generate();
        let ephemeral_public = ephemeral.public_key();

        let wrap = ephemeral.diffie_hellman(recipient).derive_wrapping_key(context);
        let nonce = EncryptionNonce::generate();
        let ciphertext = wrap.encrypt(plaintext, &nonce)?;

        Ok(Self {
            ephemeral: ephemeral_public,
            nonce,
            ciphertext,
        })
    }

    /// Open with the recipient's static secret and the same `context`.
    pub fn open(&self, recipient: &ExchangeSecret, context: &[u8]) -> Result<Vec<u8>> {
        let wrap = recipient
            .diffie_hellman(&self.ephemeral)
            .derive_wrapping_key(context);
        wrap.decrypt(&self.ciphertext, &self.nonce)
            .map_err(|_| CoreError::Authentication)
    }
}

impl fmt::Debug for SealedBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SealedBox")
            .field("ephemeral", &self.ephemeral)
            .field("len", &self.ciphertext.len())
            .finish()
    }
}
