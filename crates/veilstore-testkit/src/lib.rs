//! # veilstore testkit
//!
//! Testing utilities for veilstore.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a ready-made world (memory store + directory + client)
//!   with account helpers for multi-user scenarios
//! - **Generators**: proptest strategies for usernames, filenames, and
//!   content
//!
//! ## Fixtures
//!
//! ```rust
//! use veilstore_testkit::TestWorld;
//!
//! # async fn example() {
//! let world = TestWorld::new();
//! let alice = world.signup("alice").await;
//! alice.store("notes.txt", b"hello").await.unwrap();
//! # }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use veilstore_testkit::generators;
//!
//! proptest! {
//!     #[test]
//!     fn stored_content_loads_back(content in generators::content(4096)) {
//!         // drive a tokio runtime inside the proptest closure
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{TestSession, TestWorld};
