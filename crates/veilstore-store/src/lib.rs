//! # veilstore store
//!
//! The external collaborators of the protocol layer, behind traits:
//!
//! - [`UntrustedStore`] - the adversarial key-value backing service.
//!   Anything written here may be read, replaced, or deleted by anyone;
//!   callers protect themselves with cryptography, never with
//!   storage-side access control.
//! - [`KeyDirectory`] - the public-key directory mapping stable names to
//!   published keys.
//!
//! [`MemoryStore`] and [`MemoryDirectory`] are in-memory implementations,
//! primarily for tests; the store keeps raw accessors around so tests can
//! play the adversary.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::{MemoryDirectory, MemoryStore};
pub use traits::{DirectoryKey, KeyDirectory, UntrustedStore};
