//! The per-account key ratchet.
//!
//! A 64-byte state record lives at a fixed address, sealed under the
//! account's master key. Each [`next`] derives a replacement state from
//! the tail of the current one and overwrites it in place, so every
//! session of an account observes the same key sequence through the
//! shared address, never through in-memory state. Concurrent sessions
//! race last-writer-wins; serializing is the caller's responsibility.
//!
//! [`next`]: KeyRatchet::next

use rand::RngCore;

use veilstore_core::{crypto::derive_state, Address, SymmetricKey};
use veilstore_store::UntrustedStore;

use crate::error::{ClientError, Result};
use crate::sealed::SealedStore;

const RATCHET_CONTEXT: &str = "veilstore v1 ratchet step";

/// Length of the ratchet state record.
pub const STATE_LEN: usize = 64;

/// Handle to one account's ratchet state.
#[derive(Debug, Clone, Copy)]
pub struct KeyRatchet {
    address: Address,
}

impl KeyRatchet {
    /// Attach to the state record at `address`.
    pub const fn new(address: Address) -> Self {
        Self { address }
    }

    /// The fixed state address.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Seed the ratchet with fresh random state. Called once at account
    /// registration.
    pub async fn initialize<S: UntrustedStore>(
        &self,
        sealed: &SealedStore<S>,
        master: &SymmetricKey,
    ) -> Result<()> {
        let mut state = [0u8; STATE_LEN];
        rand::thread_rng().fill_bytes(&mut state);
        sealed.put(self.address, master, &state).await
    }

    /// Advance the ratchet and return a fresh symmetric key.
    ///
    /// The key is unpredictable without the master key, and
    /// deterministically re-derivable by any session holding it.
    pub async fn next<S: UntrustedStore>(
        &self,
        sealed: &SealedStore<S>,
        master: &SymmetricKey,
    ) -> Result<SymmetricKey> {
        let state = sealed.get(&self.address, master).await?;
        if state.len() != STATE_LEN {
            return Err(ClientError::Malformed(format!(
                "ratchet state has length {}",
                state.len()
            )));
        }

        let next = derive_state(RATCHET_CONTEXT, &state[48..]);
        sealed.put(self.address, master, &next).await?;

        let mut key = [0u8; 32];
        key.copy_from_slice(&next[..32]);
        Ok(SymmetricKey::from_bytes(key))
    }
}
