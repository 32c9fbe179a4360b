use tlg_codec::CodecError;
use tlg_ledger::LedgerError;
use tlg_store::StoreError;
use tlg_types::TypeError;

/// Errors from reconciliation.
///
/// Per-document problems in the entry collection are not errors; they are
/// counted in the run summary. These variants abort the run.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("type error: {0}")]
    Type(#[from] TypeError),

    /// A topic document could not be read back into a topic.
    #[error("invalid topic document: {0}")]
    InvalidTopicDocument(String),
}

/// Result alias for reconciliation.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Why an entry document was left out of the replay.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntrySkip {
    #[error("malformed header: {0}")]
    Malformed(#[from] CodecError),

    #[error("missing or unusable date")]
    MissingDate,

    #[error("missing topic identity")]
    MissingTopic,
}
