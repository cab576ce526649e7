//! Accounts and authenticated sessions.
//!
//! A [`Client`] binds an untrusted store to a public-key directory and
//! mints [`Session`]s. No account state lives on the client machine:
//! everything an account needs is re-derived from username and password,
//! so any number of sessions on any number of devices stay consistent
//! through the store alone.

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use veilstore_core::{
    derive_master_key, Address, ExchangePublicKey, ExchangeSecret, SigningKeypair, SymmetricKey,
    VerifyingKey,
};
use veilstore_store::{DirectoryKey, KeyDirectory, StoreError, UntrustedStore};

use crate::chain::{Capability, ChainLog};
use crate::error::{ClientError, Result};
use crate::invite::SealedInvitation;
use crate::ratchet::KeyRatchet;
use crate::record::{account_address, record_address, CellHandle, FileRecord, Role};
use crate::sealed::SealedStore;

/// Directory suffix for an account's X25519 exchange key.
const SEAL_SUFFIX: &str = "#seal";
/// Directory suffix for an account's Ed25519 verifying key.
const SIG_SUFFIX: &str = "#sig";

/// The sealed account record at the account's deterministic address.
///
/// Holds only what cannot be re-derived from the credentials: the
/// private key seeds and the location of the ratchet state.
#[derive(Serialize, Deserialize)]
struct AccountRecord {
    signing_seed: [u8; 32],
    exchange_seed: [u8; 32],
    ratchet_address: Address,
}

/// Entry point: an untrusted store paired with a key directory.
pub struct Client<S, D> {
    sealed: SealedStore<S>,
    directory: Arc<D>,
}

impl<S, D> Clone for Client<S, D> {
    fn clone(&self) -> Self {
        Self {
            sealed: self.sealed.clone(),
            directory: Arc::clone(&self.directory),
        }
    }
}

impl<S: UntrustedStore, D: KeyDirectory> Client<S, D> {
    pub fn new(store: Arc<S>, directory: Arc<D>) -> Self {
        Self {
            sealed: SealedStore::new(store),
            directory,
        }
    }

    /// Register a new account and open a session for it.
    ///
    /// Registration of the account's directory names is first-come,
    /// first-served, so a duplicate username fails here no matter which
    /// session races it.
    pub async fn create_account(&self, username: &str, password: &str) -> Result<Session<S, D>> {
        if username.is_empty() {
            return Err(ClientError::InvalidUsername);
        }

        let master = derive_master_key(username, password)?;
        let signing = SigningKeypair::generate();
        let exchange = ExchangeSecret::generate();

        let seal_key = DirectoryKey::from_bytes(*exchange.public_key().as_bytes());
        match self
            .directory
            .register(&format!("{username}{SEAL_SUFFIX}"), seal_key)
            .await
        {
            Err(StoreError::NameTaken(_)) => {
                return Err(ClientError::AlreadyExists(username.to_string()))
            }
            other => other?,
        }
        let sig_key = DirectoryKey::from_bytes(*signing.verifying_key().as_bytes());
        self.directory
            .register(&format!("{username}{SIG_SUFFIX}"), sig_key)
            .await?;

        let ratchet = KeyRatchet::new(Address::random());
        ratchet.initialize(&self.sealed, &master).await?;

        let record = AccountRecord {
            signing_seed: signing.seed(),
            exchange_seed: exchange.to_bytes(),
            ratchet_address: ratchet.address(),
        };
        self.sealed
            .put_record(account_address(username), &master, &record)
            .await?;

        tracing::debug!(username, "account created");
        Ok(Session {
            sealed: self.sealed.clone(),
            directory: Arc::clone(&self.directory),
            username: username.to_string(),
            master,
            signing,
            exchange,
            ratchet,
        })
    }

    /// Authenticate against an existing account.
    ///
    /// An unknown username fails with [`ClientError::NoSuchUser`] (the
    /// directory is checked before any key derivation), a known one with
    /// the wrong password with [`ClientError::BadPassword`].
    pub async fn open_account(&self, username: &str, password: &str) -> Result<Session<S, D>> {
        if username.is_empty() {
            return Err(ClientError::InvalidUsername);
        }
        if self
            .directory
            .lookup(&format!("{username}{SIG_SUFFIX}"))
            .await?
            .is_none()
        {
            return Err(ClientError::NoSuchUser(username.to_string()));
        }

        let master = derive_master_key(username, password)?;
        let record: AccountRecord = match self
            .sealed
            .get_record(&account_address(username), &master)
            .await
        {
            Ok(record) => record,
            // a wrong password derives a wrong master key, which fails
            // the envelope check exactly like tampering would
            Err(ClientError::Integrity) => return Err(ClientError::BadPassword),
            // the directory says the account exists, so an absent
            // record means the store dropped it
            Err(ClientError::NotFound) => return Err(ClientError::Integrity),
            Err(e) => return Err(e),
        };

        Ok(Session {
            sealed: self.sealed.clone(),
            directory: Arc::clone(&self.directory),
            username: username.to_string(),
            master,
            signing: SigningKeypair::from_seed(&record.signing_seed),
            exchange: ExchangeSecret::from_bytes(record.exchange_seed),
            ratchet: KeyRatchet::new(record.ratchet_address),
        })
    }
}

/// An authenticated account session.
///
/// Sessions hold no file state; every operation round-trips through the
/// store, so sessions of the same account observe each other's writes
/// immediately.
pub struct Session<S, D> {
    sealed: SealedStore<S>,
    directory: Arc<D>,
    username: String,
    master: SymmetricKey,
    signing: SigningKeypair,
    exchange: ExchangeSecret,
    ratchet: KeyRatchet,
}

impl<S: UntrustedStore, D: KeyDirectory> Session<S, D> {
    pub fn username(&self) -> &str {
        &self.username
    }

    fn record_address(&self, filename: &str) -> Address {
        record_address(&self.username, filename)
    }

    async fn file_record(&self, filename: &str) -> Result<FileRecord> {
        self.sealed
            .get_record(&self.record_address(filename), &self.master)
            .await
    }

    async fn save_record(&self, filename: &str, record: &FileRecord) -> Result<()> {
        self.sealed
            .put_record(self.record_address(filename), &self.master, record)
            .await
    }

    /// Mint a capability cell keyed off the account's ratchet, so any of
    /// the account's sessions derives the same key sequence.
    async fn mint_cell(&self) -> Result<CellHandle> {
        Ok(CellHandle {
            address: Address::random(),
            key: self.ratchet.next(&self.sealed, &self.master).await?,
        })
    }

    async fn directory_key(&self, name: String) -> Result<DirectoryKey> {
        self.directory
            .lookup(&name)
            .await?
            .ok_or_else(|| match name.rsplit_once('#') {
                Some((user, _)) => ClientError::NoSuchUser(user.to_string()),
                None => ClientError::NoSuchUser(name),
            })
    }

    /// Store `content` under `filename`, creating the file or replacing
    /// its entire contents.
    ///
    /// Filenames are per-account: two accounts using the same name refer
    /// to unrelated files unless a share connects them.
    pub async fn store(&self, filename: &str, content: &[u8]) -> Result<()> {
        let log = ChainLog::new(&self.sealed);
        match self.file_record(filename).await {
            Ok(record) => {
                let cap = record.cell.read(&self.sealed).await?;
                log.overwrite(&cap, content).await
            }
            Err(ClientError::NotFound) => {
                let cap = Capability::generate();
                log.create(&cap, content).await?;

                let cell = self.mint_cell().await?;
                cell.write(&self.sealed, &cap).await?;
                self.save_record(filename, &FileRecord::owned(cell)).await
            }
            Err(e) => Err(e),
        }
    }

    /// Append `data` to an existing file.
    ///
    /// Cost is independent of how much content the file already holds.
    pub async fn append(&self, filename: &str, data: &[u8]) -> Result<()> {
        let record = self.file_record(filename).await?;
        let cap = record.cell.read(&self.sealed).await?;
        ChainLog::new(&self.sealed).append(&cap, data).await
    }

    /// Read a file's full content.
    pub async fn load(&self, filename: &str) -> Result<Vec<u8>> {
        let record = self.file_record(filename).await?;
        let cap = record.cell.read(&self.sealed).await?;
        ChainLog::new(&self.sealed).read(&cap).await
    }

    /// Invite `recipient` to share `filename`. Returns the address of
    /// the invitation token; the caller passes it to the recipient over
    /// any channel, including an untrusted one.
    ///
    /// An owner issues the recipient a dedicated capability cell so the
    /// grant can be revoked individually. A delegate hands out their own
    /// cell, so the whole subtree stands or falls with the delegate.
    pub async fn share(&self, filename: &str, recipient: &str) -> Result<Address> {
        let mut record = self.file_record(filename).await?;
        // resolving our own cell proves we still hold access; a revoked
        // delegate fails here instead of issuing a dead grant
        let cap = record.cell.read(&self.sealed).await?;
        let recipient_seal = self
            .directory_key(format!("{recipient}{SEAL_SUFFIX}"))
            .await?;

        let issued = match &mut record.role {
            Role::Owner { successors } => {
                let handle = self.mint_cell().await?;
                handle.write(&self.sealed, &cap).await?;
                successors.insert(recipient.to_string(), handle);
                self.save_record(filename, &record).await?;
                handle
            }
            Role::Delegate => record.cell,
        };

        let invite = SealedInvitation::seal(
            &issued,
            &ExchangePublicKey::from_bytes(*recipient_seal.as_bytes()),
            &self.signing,
        )?;

        let token = Address::random();
        self.sealed
            .backend()
            .put(token, Bytes::from(invite.to_bytes()))
            .await?;

        tracing::debug!(from = %self.username, to = recipient, filename, "share issued");
        Ok(token)
    }

    /// Accept an invitation from `sender`, attaching the shared file to
    /// this account's namespace as `filename`.
    ///
    /// The token is authenticated against `sender`'s published signing
    /// key. The shared log is loaded before anything is persisted, so a
    /// grant revoked between issue and accept is rejected cleanly.
    pub async fn accept(&self, sender: &str, token: Address, filename: &str) -> Result<()> {
        match self.file_record(filename).await {
            Ok(_) => return Err(ClientError::AlreadyExists(filename.to_string())),
            Err(ClientError::NotFound) => {}
            Err(e) => return Err(e),
        }

        let sender_sig = self.directory_key(format!("{sender}{SIG_SUFFIX}")).await?;
        let raw = self
            .sealed
            .backend()
            .get(&token)
            .await?
            .ok_or(ClientError::NotFound)?;

        let invite = SealedInvitation::from_bytes(&raw)?;
        let handle = invite.open(
            &self.exchange,
            &VerifyingKey::from_bytes(*sender_sig.as_bytes()),
        )?;

        // a handle that no longer resolves means the grant was revoked
        // between issue and accept; report it against the sender
        let cap = handle.read(&self.sealed).await.map_err(|e| match e {
            ClientError::NotFound => ClientError::NotShared(sender.to_string()),
            other => other,
        })?;
        ChainLog::new(&self.sealed).read(&cap).await?;

        self.save_record(filename, &FileRecord::delegated(handle))
            .await?;
        // tokens are single-use
        self.sealed.delete(&token).await?;
        tracing::debug!(user = %self.username, sender, filename, "share accepted");
        Ok(())
    }

    /// Cut off `recipient`'s access to `filename`, and with it everyone
    /// the recipient shared onward to. Only the owner may revoke.
    ///
    /// The content moves to a fresh log under a fresh capability, the
    /// surviving cells are rewritten to point at it, and the old log and
    /// the revoked cell are torn down. Survivors keep working through
    /// their existing records without any action on their part.
    pub async fn revoke(&self, filename: &str, recipient: &str) -> Result<()> {
        let mut record = self.file_record(filename).await?;
        let Role::Owner { successors } = &mut record.role else {
            return Err(ClientError::NotOwner);
        };
        let revoked = successors
            .remove(recipient)
            .ok_or_else(|| ClientError::NotShared(recipient.to_string()))?;

        let log = ChainLog::new(&self.sealed);
        let old = record.cell.read(&self.sealed).await?;
        let content = log.read(&old).await?;

        let fresh = Capability::generate();
        log.create(&fresh, &content).await?;

        record.cell.write(&self.sealed, &fresh).await?;
        for handle in successors.values() {
            handle.write(&self.sealed, &fresh).await?;
        }

        log.delete(&old).await?;
        revoked.remove(&self.sealed).await?;
        self.save_record(filename, &record).await?;

        tracing::debug!(owner = %self.username, revoked = recipient, filename, "access revoked");
        Ok(())
    }
}

impl<S, D> std::fmt::Debug for Session<S, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}
