use serde::{Deserialize, Serialize};

/// Tunables of a daily run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Candidates kept from the top list after filtering.
    pub candidate_limit: usize,
    /// Entries written per run.
    pub picks_per_run: usize,
    /// Candidates tried before giving up.
    pub max_attempts: usize,
    /// Shortest acceptable lead sentence, in characters.
    pub min_sentence_chars: usize,
    pub agent_name: String,
    pub agent_version: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            candidate_limit: 100,
            picks_per_run: 1,
            max_attempts: 25,
            min_sentence_chars: 20,
            agent_name: "topic-ledger".into(),
            agent_version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}
