//! The sealed envelope store.
//!
//! Every payload that touches the untrusted store goes through here:
//! AEAD ciphertext under a fresh random nonce plus a keyed MAC over the
//! storage address and the ciphertext, with encryption and authentication
//! subkeys derived independently from the caller's key. A reader verifies
//! the MAC in constant time before decrypting; anything that fails,
//! including an envelope moved to a different address, is reported as
//! [`ClientError::Integrity`] and never partially trusted.

use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use veilstore_core::{Address, EncryptionNonce, MacTag, SymmetricKey};
use veilstore_store::UntrustedStore;

use crate::error::{ClientError, Result};

/// Wire format of every sealed write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Nonce used for encryption (unique per write).
    pub nonce: EncryptionNonce,
    /// The encrypted payload.
    pub ciphertext: Vec<u8>,
    /// Keyed MAC over the storage address and the ciphertext.
    pub tag: MacTag,
}

impl Envelope {
    /// Serialize to CBOR bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).expect("CBOR serialization failed");
        buf
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| ClientError::Malformed(e.to_string()))
    }
}

/// Authenticated-encryption layer over an untrusted store.
pub struct SealedStore<S> {
    store: Arc<S>,
}

impl<S> Clone for SealedStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: UntrustedStore> SealedStore<S> {
    /// Wrap a backing store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The raw backing store, for the few values that are stored
    /// unsealed (invitation tokens, which carry their own protection).
    pub fn backend(&self) -> &Arc<S> {
        &self.store
    }

    /// Seal `plaintext` under `key` and write it, unconditionally
    /// replacing any prior value at `address`.
    pub async fn put(
        &self,
        address: Address,
        key: &SymmetricKey,
        plaintext: &[u8],
    ) -> Result<()> {
        let nonce = EncryptionNonce::generate();
        let ciphertext = key.encrypt(plaintext, &nonce)?;
        // the tag binds the address, so relocating an envelope to
        // another address under the same key is detected
        let tag = key.mac(&address_bound(&address, &ciphertext));
        let envelope = Envelope {
            nonce,
            ciphertext,
            tag,
        };

        self.store
            .put(address, Bytes::from(envelope.to_bytes()))
            .await?;
        Ok(())
    }

    /// Read, verify, and open the value at `address`.
    ///
    /// `NotFound` when the address is empty; `Integrity` when the stored
    /// bytes fail authentication in any way.
    pub async fn get(&self, address: &Address, key: &SymmetricKey) -> Result<Vec<u8>> {
        let raw = self
            .store
            .get(address)
            .await?
            .ok_or(ClientError::NotFound)?;

        // a scribbled-over envelope is an integrity event, not a decode bug
        let envelope = Envelope::from_bytes(&raw).map_err(|_| ClientError::Integrity)?;

        key.verify_mac(&address_bound(address, &envelope.ciphertext), &envelope.tag)
            .map_err(|_| ClientError::Integrity)?;
        key.decrypt(&envelope.ciphertext, &envelope.nonce)
            .map_err(|_| ClientError::Integrity)
    }

    /// Remove the value at `address`; absent addresses are a no-op.
    pub async fn delete(&self, address: &Address) -> Result<()> {
        self.store.delete(address).await?;
        Ok(())
    }

    /// Seal a CBOR-encoded record and write it.
    pub async fn put_record<T: Serialize>(
        &self,
        address: Address,
        key: &SymmetricKey,
        record: &T,
    ) -> Result<()> {
        let mut buf = Vec::new();
        ciborium::into_writer(record, &mut buf).expect("CBOR serialization failed");
        self.put(address, key, &buf).await
    }

    /// Read, verify, and decode a sealed CBOR record.
    pub async fn get_record<T: DeserializeOwned>(
        &self,
        address: &Address,
        key: &SymmetricKey,
    ) -> Result<T> {
        let bytes = self.get(address, key).await?;
        ciborium::from_reader(bytes.as_slice()).map_err(|e| ClientError::Malformed(e.to_string()))
    }
}

fn address_bound(address: &Address, ciphertext: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(16 + ciphertext.len());
    buf.extend_from_slice(address.as_bytes());
    buf.extend_from_slice(ciphertext);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use veilstore_store::MemoryStore;

    fn sealed() -> (Arc<MemoryStore>, SealedStore<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Arc::clone(&store), SealedStore::new(store))
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let (_, sealed) = sealed();
        let key = SymmetricKey::generate();
        let address = Address::random();

        sealed.put(address, &key, b"payload").await.unwrap();
        assert_eq!(sealed.get(&address, &key).await.unwrap(), b"payload");
    }

    #[tokio::test]
    async fn test_get_absent_is_not_found() {
        let (_, sealed) = sealed();
        let result = sealed.get(&Address::random(), &SymmetricKey::generate()).await;
        assert!(matches!(result, Err(ClientError::NotFound)));
    }

    #[tokio::test]
    async fn test_wrong_key_is_integrity_error() {
        let (_, sealed) = sealed();
        let address = Address::random();

        sealed
            .put(address, &SymmetricKey::generate(), b"payload")
            .await
            .unwrap();
        let result = sealed.get(&address, &SymmetricKey::generate()).await;
        assert!(matches!(result, Err(ClientError::Integrity)));
    }

    #[tokio::test]
    async fn test_tampered_value_is_integrity_error() {
        let (store, sealed) = sealed();
        let key = SymmetricKey::generate();
        let address = Address::random();

        sealed.put(address, &key, b"payload").await.unwrap();
        assert!(store.corrupt(&address));

        let result = sealed.get(&address, &key).await;
        assert!(matches!(result, Err(ClientError::Integrity)));
    }

    #[tokio::test]
    async fn test_garbage_value_is_integrity_error() {
        let (store, sealed) = sealed();
        let address = Address::random();

        store.raw_put(address, Bytes::from_static(b"not an envelope"));
        let result = sealed.get(&address, &SymmetricKey::generate()).await;
        assert!(matches!(result, Err(ClientError::Integrity)));
    }

    #[tokio::test]
    async fn test_put_replaces_prior_value() {
        let (_, sealed) = sealed();
        let key = SymmetricKey::generate();
        let address = Address::random();

        sealed.put(address, &key, b"old").await.unwrap();
        sealed.put(address, &key, b"new").await.unwrap();
        assert_eq!(sealed.get(&address, &key).await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_relocated_envelope_is_integrity_error() {
        let (store, sealed) = sealed();
        let key = SymmetricKey::generate();
        let a = Address::random();
        let b = Address::random();

        sealed.put(a, &key, b"value a").await.unwrap();
        sealed.put(b, &key, b"value b").await.unwrap();

        // swap the two envelopes behind the protocol layer
        let raw_a = store.raw_get(&a).unwrap();
        let raw_b = store.raw_get(&b).unwrap();
        store.raw_put(a, raw_b);
        store.raw_put(b, raw_a);

        assert!(matches!(
            sealed.get(&a, &key).await,
            Err(ClientError::Integrity)
        ));
        assert!(matches!(
            sealed.get(&b, &key).await,
            Err(ClientError::Integrity)
        ));
    }

    #[tokio::test]
    async fn test_record_roundtrip() {
        let (_, sealed) = sealed();
        let key = SymmetricKey::generate();
        let address = Address::random();

        sealed
            .put_record(address, &key, &("name".to_string(), 7u64))
            .await
            .unwrap();
        let record: (String, u64) = sealed.get_record(&address, &key).await.unwrap();
        assert_eq!(record, ("name".to_string(), 7));
    }
}
