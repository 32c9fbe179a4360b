use tracing::debug;

use crate::error::LedgerResult;
use crate::ledger::TopicLedger;
use crate::records::{Derived, Observation, Topic};

/// Result of replaying an observation stream into a fresh ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayResult {
    pub ledger: TopicLedger,
    /// Derived fields for each observation, in stream order.
    pub derived: Vec<Derived>,
}

/// Deterministic rebuild helpers.
pub struct ReplayEngine;

impl ReplayEngine {
    /// Replay a chronologically ordered stream from scratch.
    ///
    /// No prior topic state is consulted. Observations must be sorted by date;
    /// entries sharing a date are taken in the order given.
    pub fn replay<'a, I>(observations: I) -> LedgerResult<ReplayResult>
    where
        I: IntoIterator<Item = &'a Observation>,
    {
        let mut ledger = TopicLedger::new();
        let mut derived = Vec::new();
        for observation in observations {
            derived.push(ledger.replay(observation)?);
        }
        debug!(
            observations = derived.len(),
            topics = ledger.len(),
            "replay complete"
        );
        Ok(ReplayResult { ledger, derived })
    }

    /// Stable sort by date, keeping the given order among same-day entries.
    pub fn sort_chronologically(observations: &mut [Observation]) {
        observations.sort_by_key(|o| o.date);
    }

    /// Rebuild a topic from nothing but its own history items.
    pub fn replay_topic(topic: &Topic) -> LedgerResult<Topic> {
        let mut rebuilt = Topic::new(topic.key.clone(), topic.title.clone());
        for item in &topic.history {
            let observation = Observation {
                date: item.date,
                topic_key: topic.key.clone(),
                title: topic.title.clone(),
                rank: item.rank,
                pageviews: item.pageviews,
                observed_text: item.observed_text.clone(),
                content_hash: item.content_hash,
                source_revision_id: item.source_revision_id,
            };
            rebuilt.replay(&observation)?;
        }
        Ok(rebuilt)
    }
}
