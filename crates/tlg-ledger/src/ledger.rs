use std::collections::BTreeMap;

use tlg_types::TopicKey;
use tracing::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::machine::TopicState;
use crate::records::{Derived, HistoryItem, Observation, Topic};

/// How strictly a new observation's date must follow the topic's last entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DateOrder {
    /// Strictly after. Used by incremental appends.
    Strict,
    /// On or after. Used by replay, where same-day entries are already sorted.
    NonDecreasing,
}

impl Topic {
    /// Append one observation, rejecting any date on or before the last entry.
    pub fn append(&mut self, observation: &Observation) -> LedgerResult<Derived> {
        self.apply(observation, DateOrder::Strict)
    }

    /// Apply one observation from a chronologically sorted stream.
    pub fn replay(&mut self, observation: &Observation) -> LedgerResult<Derived> {
        self.apply(observation, DateOrder::NonDecreasing)
    }

    fn apply(&mut self, observation: &Observation, order: DateOrder) -> LedgerResult<Derived> {
        if observation.topic_key != self.key {
            return Err(LedgerError::TopicMismatch {
                expected: self.key.clone(),
                found: observation.topic_key.clone(),
            });
        }

        let state = TopicState::of(self);
        if let Some(last) = state.last_date() {
            let attempted = observation.date;
            match order {
                DateOrder::Strict if attempted <= last => {
                    return Err(LedgerError::NonMonotonicObservation {
                        topic: self.key.clone(),
                        last,
                        attempted,
                    });
                }
                DateOrder::NonDecreasing if attempted < last => {
                    return Err(LedgerError::OutOfOrderReplay {
                        topic: self.key.clone(),
                        last,
                        attempted,
                    });
                }
                _ => {}
            }
        }

        let transition = state.step(observation.date, observation.content_hash);
        let derived = transition.derived;

        self.history
            .push(HistoryItem::from_observation(observation, derived.change_type));
        self.times_seen_total = derived.times_seen_total;
        self.sentence_changed_count = transition.next.sentence_changed_count();
        self.title = observation.title.clone();

        debug!(
            topic = %self.key,
            date = %observation.date,
            change_type = %derived.change_type,
            times_seen_total = derived.times_seen_total,
            "observation applied"
        );
        Ok(derived)
    }
}

/// Every topic's history, keyed by topic.
///
/// A ledger is built fresh for each rebuild; it holds no state that outlives
/// the run that created it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TopicLedger {
    topics: BTreeMap<TopicKey, Topic>,
}

impl TopicLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a ledger with topics loaded from topic documents.
    pub fn from_topics(topics: impl IntoIterator<Item = Topic>) -> Self {
        Self {
            topics: topics
                .into_iter()
                .map(|topic| (topic.key.clone(), topic))
                .collect(),
        }
    }

    /// Strict incremental append. Fails with `NonMonotonicObservation` when
    /// the date does not move the topic forward.
    pub fn append(&mut self, observation: &Observation) -> LedgerResult<Derived> {
        self.entry(observation).append(observation)
    }

    /// Tolerant application for chronologically sorted streams. Same-day
    /// entries are accepted with `days_since_last_seen = 0`.
    pub fn replay(&mut self, observation: &Observation) -> LedgerResult<Derived> {
        self.entry(observation).replay(observation)
    }

    /// Drop all state.
    pub fn reset(&mut self) {
        self.topics.clear();
    }

    pub fn get(&self, key: &TopicKey) -> Option<&Topic> {
        self.topics.get(key)
    }

    pub fn topics(&self) -> impl Iterator<Item = &Topic> {
        self.topics.values()
    }

    pub fn into_topics(self) -> impl Iterator<Item = Topic> {
        self.topics.into_values()
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    fn entry(&mut self, observation: &Observation) -> &mut Topic {
        self.topics
            .entry(observation.topic_key.clone())
            .or_insert_with(|| Topic::new(observation.topic_key.clone(), observation.title.clone()))
    }
}
