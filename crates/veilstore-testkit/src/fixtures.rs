//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use veilstore::{Client, Session};
use veilstore_store::{MemoryDirectory, MemoryStore};

/// A session against the in-memory test world.
pub type TestSession = Session<MemoryStore, MemoryDirectory>;

/// An in-memory store, a key directory, and a client wired to both.
///
/// The raw store and directory handles stay public so tests can inspect
/// or corrupt records behind the client's back.
pub struct TestWorld {
    pub store: Arc<MemoryStore>,
    pub directory: Arc<MemoryDirectory>,
    pub client: Client<MemoryStore, MemoryDirectory>,
}

impl TestWorld {
    /// Create an empty world.
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let directory = Arc::new(MemoryDirectory::new());
        let client = Client::new(store.clone(), directory.clone());
        Self {
            store,
            directory,
            client,
        }
    }

    /// The password fixtures use for `name`.
    pub fn password_for(name: &str) -> String {
        format!("{name}-password")
    }

    /// Register `name` with its fixture password and return the session.
    pub async fn signup(&self, name: &str) -> TestSession {
        self.client
            .create_account(name, &Self::password_for(name))
            .await
            .expect("signup failed")
    }

    /// Open a second session for an already-registered `name`.
    pub async fn login(&self, name: &str) -> TestSession {
        self.client
            .open_account(name, &Self::password_for(name))
            .await
            .expect("login failed")
    }

    /// Register `count` accounts named `user0`, `user1`, ...
    pub async fn signup_many(&self, count: usize) -> Vec<TestSession> {
        let mut sessions = Vec::with_capacity(count);
        for i in 0..count {
            sessions.push(self.signup(&format!("user{i}")).await);
        }
        sessions
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}
