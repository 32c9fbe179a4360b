//! Content fingerprinting for the topic ledger.
//!
//! A [`Fingerprint`] is the SHA-256 digest of an observed text's UTF-8 bytes.
//! It is the content identity used for change detection: two observations of
//! a topic are "unchanged" exactly when their fingerprints are equal.
//!
//! Hashing wraps the `sha2` crate; there is no normalization step, so the
//! digest is stable across runs and platforms.

pub mod hasher;

pub use hasher::{ContentHasher, Fingerprint, HasherError};
