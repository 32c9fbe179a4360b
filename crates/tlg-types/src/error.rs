use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid calendar day: {0:?}")]
    InvalidDate(String),

    #[error("unknown change type: {0:?}")]
    UnknownChangeType(String),

    #[error("topic key must not be empty")]
    EmptyTopicKey,
}
