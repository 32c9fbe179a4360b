//! Document storage for the topic ledger.
//!
//! The ledger lives in two flat collections of text documents: entries (one
//! per topic per day) and topics (one per topic). The store never interprets
//! document contents; it lists, reads, writes and deletes whole documents by
//! name.
//!
//! # Storage Backends
//!
//! All backends implement the [`DocumentStore`] trait:
//!
//! - [`InMemoryDocumentStore`] -- `BTreeMap`-based store for tests and embedding
//! - [`FsDocumentStore`] -- one file per document under a root directory
//!
//! # Design Rules
//!
//! 1. A single writer per run; no locking across processes.
//! 2. Writes go through a [`WriteBatch`] so a run stages everything before
//!    touching the store.
//! 3. A put whose bytes equal the stored document is dropped.
//! 4. File writes are atomic: temp file in the same directory, then rename.

pub mod batch;
pub mod config;
pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use batch::{CommitSummary, WriteBatch};
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use fs::FsDocumentStore;
pub use memory::InMemoryDocumentStore;
pub use traits::{validate_name, Collection, DocumentStore};
