//! # veilstore
//!
//! End-to-end encrypted file storage over an untrusted key-value store,
//! with owner-controlled sharing and revocation.
//!
//! ## Overview
//!
//! The backing store is assumed available but fully adversarial: anyone
//! who controls it can read, replace, or delete entries. Only
//! cryptography protects data, never storage-side access control.
//!
//! - **Sealed envelopes**: every write is AEAD-encrypted and MAC'd
//!   ([`SealedStore`]); any tampering surfaces as [`ClientError::Integrity`].
//! - **Content logs**: file content is a hash-chain of sealed blocks with
//!   O(1) append ([`chain`]).
//! - **Capabilities**: a `{seed, key}` pair grants read/append/overwrite
//!   of one log; capability cells add the indirection that makes
//!   rotation propagate to every holder ([`record`]).
//! - **Invitations**: capabilities travel between accounts encrypted for
//!   the recipient and signed by the sender ([`invite`]).
//! - **Revocation**: an owner rotates the capability and republishes it
//!   to the survivors without re-encrypting history ([`Session::revoke`]).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use veilstore::Client;
//! use veilstore_store::{MemoryDirectory, MemoryStore};
//!
//! async fn example() {
//!     let client = Client::new(Arc::new(MemoryStore::new()), Arc::new(MemoryDirectory::new()));
//!
//!     let alice = client.create_account("alice", "password").await.unwrap();
//!     alice.store("notes.txt", b"hello").await.unwrap();
//!
//!     let bob = client.create_account("bob", "hunter2").await.unwrap();
//!     let token = alice.share("notes.txt", "bob").await.unwrap();
//!     bob.accept("alice", token, "from-alice.txt").await.unwrap();
//!
//!     alice.revoke("notes.txt", "bob").await.unwrap();
//! }
//! ```

pub mod chain;
pub mod client;
pub mod error;
pub mod invite;
pub mod ratchet;
pub mod record;
pub mod sealed;

pub use chain::{Capability, ChainLog};
pub use client::{Client, Session};
pub use error::{ClientError, Result};
pub use invite::SealedInvitation;
pub use ratchet::KeyRatchet;
pub use record::{CapabilityCell, CellHandle, FileRecord, Role};
pub use sealed::{Envelope, SealedStore};

// Re-export component crates for convenience
pub use veilstore_core as core;
pub use veilstore_store as store;
