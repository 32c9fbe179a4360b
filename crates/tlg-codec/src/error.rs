use thiserror::Error;

/// Errors produced by the header codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The document does not start with the `---` delimiter line.
    #[error("document does not start with a header delimiter")]
    MissingOpenDelimiter,

    /// The header was opened but never closed.
    #[error("header is not closed")]
    UnclosedHeader,

    /// A key that cannot be written as a header key.
    #[error("invalid header key: {0:?}")]
    InvalidKey(String),
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
