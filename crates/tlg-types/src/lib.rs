//! Foundation types for the topic ledger.
//!
//! Every other ledger crate depends on `tlg-types`.
//!
//! # Key Types
//!
//! - [`TopicKey`]: Case-insensitive topic identity, with a file-system slug
//! - [`ChangeType`]: Classification of an observation against its topic history
//! - [`Day`]: Calendar day used for entry dates (`YYYY-MM-DD`)

pub mod change;
pub mod day;
pub mod error;
pub mod topic;

pub use change::ChangeType;
pub use day::{days_between, parse_day, Day};
pub use error::TypeError;
pub use topic::{slugify, TopicKey};
