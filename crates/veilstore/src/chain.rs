//! Hash-chained append-only content logs.
//!
//! A log is anchored by a [`Capability`]: a random 64-byte seed and a
//! symmetric key. Block `n` of the log lives at the address of the n-th
//! iterated hash of the seed, and a sealed frontier marker at the seed's
//! own address records the next unused chain position. Appending writes
//! one block and advances the frontier, so it never touches existing
//! content regardless of how large the log has grown.
//!
//! Anyone holding the capability can derive every block address and key;
//! nobody else can locate or decrypt any of them.

use serde::{Deserialize, Serialize};

use veilstore_core::{ChainDigest, ChainSeed, SymmetricKey};
use veilstore_store::UntrustedStore;

use crate::error::{ClientError, Result};
use crate::sealed::SealedStore;

/// Full access to one content log: its chain seed and sealing key.
#[derive(Clone, Copy, Serialize, Deserialize)]
pub struct Capability {
    pub seed: ChainSeed,
    pub key: SymmetricKey,
}

impl Capability {
    /// Mint a capability for a brand-new log.
    pub fn generate() -> Self {
        Self {
            seed: ChainSeed::generate(),
            key: SymmetricKey::generate(),
        }
    }
}

impl std::fmt::Debug for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // never print the key
        f.debug_struct("Capability")
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

/// Operations over content logs in one sealed store.
pub struct ChainLog<'a, S> {
    sealed: &'a SealedStore<S>,
}

impl<'a, S: UntrustedStore> ChainLog<'a, S> {
    pub fn new(sealed: &'a SealedStore<S>) -> Self {
        Self { sealed }
    }

    async fn frontier(&self, cap: &Capability) -> Result<ChainDigest> {
        let raw = self.sealed.get(&cap.seed.address(), &cap.key).await?;
        ChainDigest::try_from(raw.as_slice())
            .map_err(|_| ClientError::Malformed(format!("frontier has length {}", raw.len())))
    }

    async fn set_frontier(&self, cap: &Capability, frontier: ChainDigest) -> Result<()> {
        self.sealed
            .put(cap.seed.address(), &cap.key, frontier.as_bytes())
            .await
    }

    /// Start a log with `payload` as its only block.
    ///
    /// Fails with [`ClientError::AlreadyExists`] if a frontier marker is
    /// already present under this capability.
    pub async fn create(&self, cap: &Capability, payload: &[u8]) -> Result<()> {
        match self.frontier(cap).await {
            Ok(_) => {
                return Err(ClientError::AlreadyExists(
                    cap.seed.address().to_hex(),
                ))
            }
            Err(ClientError::NotFound) => {}
            Err(e) => return Err(e),
        }
        let head = cap.seed.first_link();
        self.sealed.put(head.address(), &cap.key, payload).await?;
        self.set_frontier(cap, head.next()).await
    }

    /// Replace the log's entire content with a single block.
    ///
    /// Old blocks are removed from the store first so the log does not
    /// leak stale ciphertext at reachable addresses.
    ///
    /// An aborted prior overwrite may have removed the frontier without
    /// writing the new one; that state is indistinguishable from already
    /// clean, so a missing frontier here is not an error and the whole
    /// operation stays safe to re-run.
    pub async fn overwrite(&self, cap: &Capability, payload: &[u8]) -> Result<()> {
        match self.delete(cap).await {
            Ok(()) | Err(ClientError::NotFound) => {}
            Err(e) => return Err(e),
        }
        let head = cap.seed.first_link();
        self.sealed.put(head.address(), &cap.key, payload).await?;
        self.set_frontier(cap, head.next()).await
    }

    /// Add one block at the frontier. O(1) in the log's length.
    pub async fn append(&self, cap: &Capability, payload: &[u8]) -> Result<()> {
        let frontier = self.frontier(cap).await?;
        self.sealed
            .put(frontier.address(), &cap.key, payload)
            .await?;
        self.set_frontier(cap, frontier.next()).await
    }

    /// Read the full content, all blocks concatenated in append order.
    pub async fn read(&self, cap: &Capability) -> Result<Vec<u8>> {
        let frontier = self.frontier(cap).await?;
        let mut content = Vec::new();
        let mut link = cap.seed.first_link();
        while link != frontier {
            let block = self.sealed.get(&link.address(), &cap.key).await?;
            content.extend_from_slice(&block);
            link = link.next();
        }
        Ok(content)
    }

    /// Remove every block and the frontier marker from the store.
    pub async fn delete(&self, cap: &Capability) -> Result<()> {
        let frontier = self.frontier(cap).await?;
        let mut link = cap.seed.first_link();
        while link != frontier {
            self.sealed.delete(&link.address()).await?;
            link = link.next();
        }
        self.sealed.delete(&cap.seed.address()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use veilstore_store::MemoryStore;

    fn setup() -> (Arc<MemoryStore>, SealedStore<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let sealed = SealedStore::new(store.clone());
        (store, sealed)
    }

    #[tokio::test]
    async fn test_create_and_read() {
        let (_, sealed) = setup();
        let log = ChainLog::new(&sealed);
        let cap = Capability::generate();

        log.create(&cap, b"hello").await.unwrap();
        assert_eq!(log.read(&cap).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_create_twice_fails() {
        let (_, sealed) = setup();
        let log = ChainLog::new(&sealed);
        let cap = Capability::generate();

        log.create(&cap, b"first").await.unwrap();
        assert!(matches!(
            log.create(&cap, b"second").await,
            Err(ClientError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_append_concatenates_in_order() {
        let (_, sealed) = setup();
        let log = ChainLog::new(&sealed);
        let cap = Capability::generate();

        log.create(&cap, b"one ").await.unwrap();
        log.append(&cap, b"two ").await.unwrap();
        log.append(&cap, b"three").await.unwrap();
        assert_eq!(log.read(&cap).await.unwrap(), b"one two three");
    }

    #[tokio::test]
    async fn test_append_touches_constant_number_of_records() {
        let (store, sealed) = setup();
        let log = ChainLog::new(&sealed);
        let cap = Capability::generate();

        log.create(&cap, b"base").await.unwrap();
        for _ in 0..20 {
            log.append(&cap, b"x").await.unwrap();
        }
        let before = store.len();
        log.append(&cap, b"y").await.unwrap();
        // one new block; the frontier record is replaced in place
        assert_eq!(store.len(), before + 1);
    }

    #[tokio::test]
    async fn test_overwrite_discards_history() {
        let (store, sealed) = setup();
        let log = ChainLog::new(&sealed);
        let cap = Capability::generate();

        log.create(&cap, b"old").await.unwrap();
        log.append(&cap, b" tail").await.unwrap();
        log.overwrite(&cap, b"new").await.unwrap();

        assert_eq!(log.read(&cap).await.unwrap(), b"new");
        // one block plus the frontier marker
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_overwrite_recovers_from_interrupted_run() {
        let (_, sealed) = setup();
        let log = ChainLog::new(&sealed);
        let cap = Capability::generate();

        log.create(&cap, b"first").await.unwrap();
        log.append(&cap, b" half").await.unwrap();

        // an overwrite that aborted after its delete step leaves the
        // log entirely gone; re-running the overwrite must succeed
        log.delete(&cap).await.unwrap();
        log.overwrite(&cap, b"second").await.unwrap();
        assert_eq!(log.read(&cap).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_delete_leaves_no_records() {
        let (store, sealed) = setup();
        let log = ChainLog::new(&sealed);
        let cap = Capability::generate();

        log.create(&cap, b"data").await.unwrap();
        log.append(&cap, b"more").await.unwrap();
        log.delete(&cap).await.unwrap();

        assert!(store.is_empty());
        assert!(matches!(log.read(&cap).await, Err(ClientError::NotFound)));
    }

    #[tokio::test]
    async fn test_missing_log_is_not_found() {
        let (_, sealed) = setup();
        let log = ChainLog::new(&sealed);
        let cap = Capability::generate();

        assert!(matches!(log.read(&cap).await, Err(ClientError::NotFound)));
        assert!(matches!(
            log.append(&cap, b"x").await,
            Err(ClientError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_capabilities_are_isolated() {
        let (_, sealed) = setup();
        let log = ChainLog::new(&sealed);
        let a = Capability::generate();
        let b = Capability::generate();

        log.create(&a, b"alpha").await.unwrap();
        log.create(&b, b"beta").await.unwrap();
        assert_eq!(log.read(&a).await.unwrap(), b"alpha");
        assert_eq!(log.read(&b).await.unwrap(), b"beta");
    }
}
