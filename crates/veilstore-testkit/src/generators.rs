//! Proptest generators for property-based testing.

use proptest::prelude::*;

use veilstore_core::{Address, ChainSeed, SymmetricKey};

/// Generate a plausible username.
pub fn username() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,15}".prop_map(String::from)
}

/// Generate a plausible filename, including awkward but legal ones.
pub fn filename() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9._-]{1,32}".prop_map(String::from),
        Just(String::new()),
        Just(" ".to_string()),
        Just("..".to_string()),
    ]
}

/// Generate a password, empty included.
pub fn password() -> impl Strategy<Value = String> {
    "[ -~]{0,32}".prop_map(String::from)
}

/// Generate content bytes up to `max_len`.
pub fn content(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a sequence of append chunks.
pub fn chunks(max_chunks: usize, max_len: usize) -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(content(max_len), 0..=max_chunks)
}

/// Generate a random store address.
pub fn address() -> impl Strategy<Value = Address> {
    any::<[u8; 16]>().prop_map(Address::from_bytes)
}

/// Generate a random symmetric key.
pub fn symmetric_key() -> impl Strategy<Value = SymmetricKey> {
    any::<[u8; 32]>().prop_map(SymmetricKey::from_bytes)
}

/// Generate a random chain seed.
pub fn chain_seed() -> impl Strategy<Value = ChainSeed> {
    any::<[u8; 64]>().prop_map(ChainSeed::from_bytes)
}
