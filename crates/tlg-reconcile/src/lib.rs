//! Full-ledger reconciliation.
//!
//! A rebuild reads every entry document, replays them in `(date, name)` order
//! through a fresh [`tlg_ledger::TopicLedger`], patches each entry's derived
//! fields in place and regenerates every topic document from the result.
//! Documents that cannot be parsed, or that lack a date or topic, are skipped
//! and counted; they never stop the run.
//!
//! Running a rebuild twice in a row writes nothing the second time.

pub mod entry;
pub mod error;
pub mod reconciler;
pub mod topic_doc;

pub use entry::{derived_fields, extract, EntryDocument, CARRIED_KEYS, IDENTITY_KEYS};
pub use error::{EntrySkip, ReconcileError, ReconcileResult};
pub use reconciler::{RebuildPlan, RebuildSummary, Reconciler, VerifyReport};
pub use topic_doc::{assign_slugs, find_topic, load_topics, unique_slug, StoredTopic};
