use crate::traits::Collection;

/// Errors from document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document not found: {collection}/{name}")]
    NotFound { collection: Collection, name: String },

    /// Document names are plain file names: no separators, no leading dot.
    #[error("invalid document name: {0:?}")]
    InvalidName(String),

    #[error("document {collection}/{name} is not valid UTF-8")]
    InvalidUtf8 { collection: Collection, name: String },

    /// The atomic rename of a staged temp file failed.
    #[error("failed to persist {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
