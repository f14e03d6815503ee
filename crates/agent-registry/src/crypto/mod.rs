//! Cryptographic primitives: Ed25519 key pairs and raw signing.
//!
//! The registry itself stores no key material; these helpers exist for
//! callers producing deadline-bound authorizations and for tests.

pub mod keys;
pub mod signing;

pub use keys::Ed25519KeyPair;
