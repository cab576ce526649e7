//! In-memory implementations of the collaborator traits.
//!
//! Primarily for testing. [`MemoryStore`] additionally exposes raw
//! accessors so adversarial tests can substitute, corrupt, or drop
//! stored values the way a hostile operator could.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::trace;

use veilstore_core::Address;

use crate::error::{Result, StoreError};
use crate::traits::{DirectoryKey, KeyDirectory, UntrustedStore};

/// In-memory untrusted store. Thread-safe via RwLock; all data is lost
/// when dropped.
pub struct MemoryStore {
    entries: RwLock<HashMap<Address, Bytes>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every currently occupied address.
    pub fn addresses(&self) -> Vec<Address> {
        self.entries.read().unwrap().keys().copied().collect()
    }

    /// Read raw stored bytes, bypassing the protocol layer.
    pub fn raw_get(&self, address: &Address) -> Option<Bytes> {
        self.entries.read().unwrap().get(address).cloned()
    }

    /// Overwrite raw stored bytes, bypassing the protocol layer.
    pub fn raw_put(&self, address: Address, value: Bytes) {
        self.entries.write().unwrap().insert(address, value);
    }

    /// Drop the value at `address`, bypassing the protocol layer.
    pub fn raw_delete(&self, address: &Address) {
        self.entries.write().unwrap().remove(address);
    }

    /// Flip one byte of the value at `address`, as an adversary would.
    ///
    /// Returns false when the address holds nothing to corrupt.
    pub fn corrupt(&self, address: &Address) -> bool {
        let mut entries = self.entries.write().unwrap();
        match entries.get(address) {
            Some(value) if !value.is_empty() => {
                let mut bytes = value.to_vec();
                bytes[0] ^= 0x01;
                entries.insert(*address, Bytes::from(bytes));
                true
            }
            _ => false,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UntrustedStore for MemoryStore {
    async fn put(&self, address: Address, value: Bytes) -> Result<()> {
        trace!(address = %address.to_hex(), len = value.len(), "put");
        self.entries.write().unwrap().insert(address, value);
        Ok(())
    }

    async fn get(&self, address: &Address) -> Result<Option<Bytes>> {
        Ok(self.entries.read().unwrap().get(address).cloned())
    }

    async fn delete(&self, address: &Address) -> Result<()> {
        trace!(address = %address.to_hex(), "delete");
        self.entries.write().unwrap().remove(address);
        Ok(())
    }
}

/// In-memory public-key directory.
pub struct MemoryDirectory {
    keys: RwLock<HashMap<String, DirectoryKey>>,
}

impl MemoryDirectory {
    /// Create a new empty directory.
    pub fn new() -> Self {
        Self {
            keys: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyDirectory for MemoryDirectory {
    async fn register(&self, name: &str, key: DirectoryKey) -> Result<()> {
        let mut keys = self.keys.write().unwrap();
        if keys.contains_key(name) {
            return Err(StoreError::NameTaken(name.to_string()));
        }
        keys.insert(name.to_string(), key);
        Ok(())
    }

    async fn lookup(&self, name: &str) -> Result<Option<DirectoryKey>> {
        Ok(self.keys.read().unwrap().get(name).copied())
    }
}
