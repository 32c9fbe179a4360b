//! The per-topic change-detection state machine.
//!
//! A topic is `New` until its first entry and `Seen` afterwards. Stepping the
//! machine is pure: it takes the current state and a candidate `(date, hash)`
//! and returns the derived fields plus the next state. Ordering checks live in
//! the ledger, not here.

use tlg_crypto::Fingerprint;
use tlg_types::{days_between, ChangeType, Day};

use crate::records::{Derived, Topic};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TopicState {
    New,
    Seen {
        first_seen: Day,
        last_date: Day,
        /// Most recent known hash. An entry without a hash leaves it as is.
        last_hash: Option<Fingerprint>,
        times_seen_total: u32,
        sentence_changed_count: u32,
    },
}

/// Outcome of one step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub derived: Derived,
    pub next: TopicState,
}

impl TopicState {
    /// Current state of an existing topic.
    pub fn of(topic: &Topic) -> Self {
        match (topic.first_seen(), topic.last_seen()) {
            (Some(first_seen), Some(last_date)) => Self::Seen {
                first_seen,
                last_date,
                last_hash: topic.last_hash(),
                times_seen_total: topic.times_seen_total,
                sentence_changed_count: topic.sentence_changed_count,
            },
            _ => Self::New,
        }
    }

    pub fn last_date(&self) -> Option<Day> {
        match self {
            Self::New => None,
            Self::Seen { last_date, .. } => Some(*last_date),
        }
    }

    pub fn sentence_changed_count(&self) -> u32 {
        match self {
            Self::New => 0,
            Self::Seen {
                sentence_changed_count,
                ..
            } => *sentence_changed_count,
        }
    }

    /// Classify a candidate entry and advance.
    ///
    /// An absent hash never matches, so it classifies as `modified` once the
    /// topic has been seen.
    pub fn step(&self, date: Day, hash: Option<Fingerprint>) -> Transition {
        match *self {
            Self::New => Transition {
                derived: Derived {
                    times_seen_total: 1,
                    first_seen: date,
                    days_since_last_seen: None,
                    sentence_changed: true,
                    change_type: ChangeType::FirstSeen,
                },
                next: Self::Seen {
                    first_seen: date,
                    last_date: date,
                    last_hash: hash,
                    times_seen_total: 1,
                    sentence_changed_count: 1,
                },
            },
            Self::Seen {
                first_seen,
                last_date,
                last_hash,
                times_seen_total,
                sentence_changed_count,
            } => {
                let unchanged = hash.is_some() && hash == last_hash;
                let (change_type, changed_count) = if unchanged {
                    (ChangeType::Unchanged, sentence_changed_count)
                } else {
                    (ChangeType::Modified, sentence_changed_count + 1)
                };
                let times = times_seen_total + 1;
                Transition {
                    derived: Derived {
                        times_seen_total: times,
                        first_seen,
                        days_since_last_seen: Some(days_between(last_date, date)),
                        sentence_changed: !unchanged,
                        change_type,
                    },
                    next: Self::Seen {
                        first_seen,
                        last_date: date,
                        last_hash: hash.or(last_hash),
                        times_seen_total: times,
                        sentence_changed_count: changed_count,
                    },
                }
            }
        }
    }
}
