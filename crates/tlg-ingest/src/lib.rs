//! Daily ingestion for the topic ledger.
//!
//! A run takes the day's ranked candidate list, orders it with the seeded
//! sampler (seed = the date as `YYYYMMDD`), and walks that order fetching
//! summaries until enough entries are produced. Each new entry is appended to
//! its topic strictly after the topic's last entry, and the entry and topic
//! documents are committed in one batch.
//!
//! Fetching is behind the [`Fetcher`] trait. [`StaticFetcher`] serves
//! summaries from a JSON file; no network client lives in this workspace.

pub mod candidates;
pub mod config;
pub mod daily;
pub mod error;
pub mod fetch;
pub mod lead;

pub use candidates::{is_ordinary, Candidate};
pub use config::IngestConfig;
pub use daily::{seed_for, DailyOutcome, DailyRun, WrittenEntry};
pub use error::{FetchError, IngestError, IngestResult};
pub use fetch::{FetchedSummary, Fetcher, StaticFetcher};
pub use lead::first_declarative;
