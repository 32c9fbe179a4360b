//! Key-value header codec for topic ledger documents.
//!
//! Every ledger document is a header block followed by free-form body text:
//!
//! ```text
//! ---
//! date: "2024-01-10"
//! rank: 3
//! history:
//!   - date: "2024-01-01"
//!     change_type: "first_seen"
//! ---
//! body text, never touched by the codec
//! ```
//!
//! The grammar is deliberately small: one `key: value` per line, values are
//! typed scalars ([`Scalar`]) or a list of flat records ([`Value::List`]).
//!
//! # Contracts
//!
//! - [`set`] replaces a key in place, or inserts it right before the closing
//!   delimiter. Bytes outside the touched lines are preserved exactly.
//! - [`set`] is idempotent.
//! - [`get`] after [`set`] returns the value that was set.
//! - Malformed documents are never rewritten; [`set`] reports
//!   [`PatchOutcome::Malformed`] and hands back the input unchanged.

pub mod document;
pub mod error;
pub mod header;
pub mod patch;
pub mod value;

mod layout;

pub use document::DocumentBuilder;
pub use error::{CodecError, CodecResult};
pub use header::{get, Header};
pub use patch::{set, set_all, Patch, PatchOutcome};
pub use value::{Record, Scalar, Value};

/// The line that opens and closes a header block.
pub const DELIMITER: &str = "---";
