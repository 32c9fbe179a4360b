//! Topic histories and change detection for the topic ledger.
//!
//! This crate is the heart of the ledger. It provides:
//! - Observation, derived-field, history and topic record types
//! - The per-topic change-detection state machine (`NEW` → `SEEN`)
//! - `TopicLedger` with strict incremental `append` and tolerant `replay`
//! - `ReplayEngine` for rebuilding every topic from a chronological stream
//! - Topic validation against the history invariants

pub mod error;
pub mod ledger;
pub mod machine;
pub mod records;
pub mod replay;
pub mod validation;

pub use error::{LedgerError, LedgerResult};
pub use ledger::TopicLedger;
pub use machine::{TopicState, Transition};
pub use records::{Derived, HistoryItem, Observation, Topic};
pub use replay::{ReplayEngine, ReplayResult};
pub use validation::{TopicValidator, ValidationReport, Violation, ViolationKind};
