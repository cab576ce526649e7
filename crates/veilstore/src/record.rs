//! Per-file bookkeeping: capability cells and file records.
//!
//! Access to a shared log is indirected through a capability cell, one
//! per direct recipient, stored at a random address under its own key.
//! Rewriting a cell in place retargets every reader downstream of it,
//! which is what lets the owner swap logs during revocation without
//! contacting anyone.
//!
//! A [`FileRecord`] is a user's private note about one filename: the
//! handle of the cell they read through, and whether they own the file.
//! The owner's record also lists the cell handle issued to each direct
//! recipient, keyed by recipient name, so individual grants can be
//! rewritten or torn down later.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use veilstore_core::{Address, ChainDigest, SymmetricKey};
use veilstore_store::UntrustedStore;

use crate::chain::Capability;
use crate::error::Result;
use crate::sealed::SealedStore;

/// The sealed contents of a capability cell.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CapabilityCell {
    pub capability: Capability,
}

/// Location and key of one capability cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellHandle {
    pub address: Address,
    pub key: SymmetricKey,
}

impl CellHandle {
    /// Mint a handle at a fresh random address with a fresh key.
    pub fn generate() -> Self {
        Self {
            address: Address::random(),
            key: SymmetricKey::generate(),
        }
    }

    /// Write `capability` into the cell, replacing any previous value.
    pub async fn write<S: UntrustedStore>(
        &self,
        sealed: &SealedStore<S>,
        capability: &Capability,
    ) -> Result<()> {
        let cell = CapabilityCell {
            capability: *capability,
        };
        sealed.put_record(self.address, &self.key, &cell).await
    }

    /// Read the capability currently in the cell.
    pub async fn read<S: UntrustedStore>(&self, sealed: &SealedStore<S>) -> Result<Capability> {
        let cell: CapabilityCell = sealed.get_record(&self.address, &self.key).await?;
        Ok(cell.capability)
    }

    /// Remove the cell from the store.
    pub async fn remove<S: UntrustedStore>(&self, sealed: &SealedStore<S>) -> Result<()> {
        sealed.delete(&self.address).await
    }
}

/// A user's standing with respect to one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Role {
    /// Creator of the file. `successors` maps each direct recipient's
    /// username to the cell handle issued to them.
    Owner {
        successors: BTreeMap<String, CellHandle>,
    },
    /// Holder of a share accepted from someone else.
    Delegate,
}

/// A user's private record for one filename in their namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub cell: CellHandle,
    pub role: Role,
}

impl FileRecord {
    /// Record for a file this user created.
    pub fn owned(cell: CellHandle) -> Self {
        Self {
            cell,
            role: Role::Owner {
                successors: BTreeMap::new(),
            },
        }
    }

    /// Record for a file accepted through a share.
    pub fn delegated(cell: CellHandle) -> Self {
        Self {
            cell,
            role: Role::Delegate,
        }
    }
}

/// Deterministic address of a user's record for `filename`.
///
/// Hashing the two names separately before combining them keeps
/// ("ab", "c") and ("a", "bc") at distinct addresses.
pub fn record_address(username: &str, filename: &str) -> Address {
    let mut material = Vec::with_capacity(128);
    material.extend_from_slice(ChainDigest::hash(username.as_bytes()).as_bytes());
    material.extend_from_slice(ChainDigest::hash(filename.as_bytes()).as_bytes());
    ChainDigest::hash(&material).address()
}

/// Deterministic address of a user's account record.
pub fn account_address(username: &str) -> Address {
    let inner = ChainDigest::hash(username.as_bytes());
    ChainDigest::hash(inner.as_bytes()).address()
}
