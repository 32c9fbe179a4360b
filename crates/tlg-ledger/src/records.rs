use serde::{Deserialize, Serialize};
use tlg_crypto::Fingerprint;
use tlg_types::{ChangeType, Day, TopicKey};

/// One dated observation of a topic, as read from an entry document or
/// produced by an ingestion run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub date: Day,
    pub topic_key: TopicKey,
    /// Display title of the topic on this day.
    pub title: String,
    pub rank: Option<i64>,
    /// Weight basis for the day.
    pub pageviews: Option<i64>,
    pub observed_text: Option<String>,
    /// Absent when the entry carries neither a hash nor text to hash.
    pub content_hash: Option<Fingerprint>,
    pub source_revision_id: Option<i64>,
}

impl Observation {
    /// Minimal observation with no ranking or revision data.
    pub fn new(date: Day, topic_key: TopicKey, content_hash: Option<Fingerprint>) -> Self {
        let title = topic_key.as_str().to_string();
        Self {
            date,
            topic_key,
            title,
            rank: None,
            pageviews: None,
            observed_text: None,
            content_hash,
            source_revision_id: None,
        }
    }
}

/// Fields of an entry that are computed from its topic's earlier entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Derived {
    pub times_seen_total: u32,
    pub first_seen: Day,
    /// `None` exactly when this is the first observation.
    pub days_since_last_seen: Option<i64>,
    pub sentence_changed: bool,
    pub change_type: ChangeType,
}

/// Snapshot of one entry inside a topic's history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub date: Day,
    pub rank: Option<i64>,
    pub pageviews: Option<i64>,
    pub observed_text: Option<String>,
    pub content_hash: Option<Fingerprint>,
    pub change_type: ChangeType,
    pub source_revision_id: Option<i64>,
}

impl HistoryItem {
    pub fn from_observation(observation: &Observation, change_type: ChangeType) -> Self {
        Self {
            date: observation.date,
            rank: observation.rank,
            pageviews: observation.pageviews,
            observed_text: observation.observed_text.clone(),
            content_hash: observation.content_hash,
            change_type,
            source_revision_id: observation.source_revision_id,
        }
    }
}

/// Aggregate history of one topic.
///
/// `history` is ordered by date ascending and holds one item per entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub key: TopicKey,
    pub title: String,
    pub times_seen_total: u32,
    pub sentence_changed_count: u32,
    pub history: Vec<HistoryItem>,
}

impl Topic {
    /// A topic with no entries yet.
    pub fn new(key: TopicKey, title: impl Into<String>) -> Self {
        Self {
            key,
            title: title.into(),
            times_seen_total: 0,
            sentence_changed_count: 0,
            history: Vec::new(),
        }
    }

    pub fn first_seen(&self) -> Option<Day> {
        self.history.first().map(|item| item.date)
    }

    pub fn last_seen(&self) -> Option<Day> {
        self.history.last().map(|item| item.date)
    }

    /// Most recent hash in the history. Items without a hash are skipped.
    pub fn last_hash(&self) -> Option<Fingerprint> {
        self.history.iter().rev().find_map(|item| item.content_hash)
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
