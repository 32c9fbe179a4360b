use tlg_codec::CodecError;
use tlg_ledger::LedgerError;
use tlg_reconcile::ReconcileError;
use tlg_sample::SampleError;
use tlg_store::StoreError;
use tlg_types::{Day, TypeError};

/// Errors from an ingestion run.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("reconcile error: {0}")]
    Reconcile(#[from] ReconcileError),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("sample error: {0}")]
    Sample(#[from] SampleError),

    #[error("type error: {0}")]
    Type(#[from] TypeError),

    #[error("invalid input: {0}")]
    InvalidInput(#[from] serde_json::Error),

    #[error("no eligible candidates for {0}")]
    NoCandidates(Day),

    /// Every attempt failed to produce an entry.
    #[error("no entry produced after {attempts} attempts")]
    Exhausted { attempts: usize },

    /// An entry just rendered could not be read back.
    #[error("rendered entry {name} is unreadable: {reason}")]
    Unreadable { name: String, reason: String },
}

/// Result alias for ingestion.
pub type IngestResult<T> = Result<T, IngestError>;

/// Failure to obtain a summary for one article.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("no summary for {0}")]
    NotFound(String),

    #[error("fetch of {article} failed: {reason}")]
    Failed { article: String, reason: String },
}
