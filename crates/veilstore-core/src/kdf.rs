//! Password-based master-key derivation.
//!
//! Every account's master key is Argon2id over the password with the
//! hashed username as salt, so the same credentials derive the same key
//! in any session on any machine.

use argon2::Argon2;

use crate::crypto::SymmetricKey;
use crate::error::{CoreError, Result};

/// Derive an account's 32-byte master key from its credentials.
pub fn derive_master_key(username: &str, password: &str) -> Result<SymmetricKey> {
    let salt = blake3::hash(username.as_bytes());
    let mut out = [0u8; 32];

    Argon2::default()
        .hash_password_into(password.as_bytes(), salt.as_bytes(), &mut out)
        .map_err(|e| CoreError::KeyDerivation(e.to_string()))?;

    Ok(SymmetricKey::from_bytes(out))
}
