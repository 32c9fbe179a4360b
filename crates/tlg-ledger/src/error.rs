use tlg_types::{Day, TopicKey};

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// An incremental append was dated on or before the topic's last entry.
    #[error("observation for {topic} dated {attempted} is not after last entry {last}")]
    NonMonotonicObservation {
        topic: TopicKey,
        last: Day,
        attempted: Day,
    },

    /// A replayed observation was dated before the topic's last entry.
    #[error("replay of {topic} went backwards: {attempted} precedes {last}")]
    OutOfOrderReplay {
        topic: TopicKey,
        last: Day,
        attempted: Day,
    },

    #[error("observation for {found} applied to topic {expected}")]
    TopicMismatch { expected: TopicKey, found: TopicKey },
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
