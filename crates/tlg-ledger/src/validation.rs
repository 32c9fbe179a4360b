use tlg_types::{ChangeType, TopicKey};

use crate::ledger::TopicLedger;
use crate::machine::TopicState;
use crate::records::Topic;

/// Result of validating one topic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    pub topic: TopicKey,
    pub history_len: usize,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific invariant violation in a topic's history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// History index the violation was found at, if it is item-specific.
    pub index: Option<usize>,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    EmptyHistory,
    DateOrder,
    FirstNotFirstSeen,
    ChangeTypeMismatch,
    TimesSeenMismatch,
    ChangedCountMismatch,
}

/// Checks topics against the history invariants.
pub struct TopicValidator;

impl TopicValidator {
    pub fn validate(topic: &Topic) -> ValidationReport {
        let mut violations = Vec::new();

        if topic.history.is_empty() {
            violations.push(Violation {
                index: None,
                kind: ViolationKind::EmptyHistory,
                description: "topic has no history items".into(),
            });
        }

        let mut state = TopicState::New;
        for (index, item) in topic.history.iter().enumerate() {
            if let Some(last) = state.last_date() {
                if item.date < last {
                    violations.push(Violation {
                        index: Some(index),
                        kind: ViolationKind::DateOrder,
                        description: format!("{} precedes previous item {last}", item.date),
                    });
                }
            }

            if index == 0 && item.change_type != ChangeType::FirstSeen {
                violations.push(Violation {
                    index: Some(0),
                    kind: ViolationKind::FirstNotFirstSeen,
                    description: format!("first item is {}", item.change_type),
                });
            }

            let transition = state.step(item.date, item.content_hash);
            if index > 0 && transition.derived.change_type != item.change_type {
                violations.push(Violation {
                    index: Some(index),
                    kind: ViolationKind::ChangeTypeMismatch,
                    description: format!(
                        "recorded {}, hashes imply {}",
                        item.change_type, transition.derived.change_type
                    ),
                });
            }
            state = transition.next;
        }

        if topic.times_seen_total as usize != topic.history.len() {
            violations.push(Violation {
                index: None,
                kind: ViolationKind::TimesSeenMismatch,
                description: format!(
                    "times_seen_total {} but {} history items",
                    topic.times_seen_total,
                    topic.history.len()
                ),
            });
        }

        let modified = topic
            .history
            .iter()
            .filter(|item| item.change_type == ChangeType::Modified)
            .count();
        let expected_changed = if topic.history.is_empty() { 0 } else { modified + 1 };
        if topic.sentence_changed_count as usize != expected_changed {
            violations.push(Violation {
                index: None,
                kind: ViolationKind::ChangedCountMismatch,
                description: format!(
                    "sentence_changed_count {} but expected {expected_changed}",
                    topic.sentence_changed_count
                ),
            });
        }

        ValidationReport {
            topic: topic.key.clone(),
            history_len: topic.history.len(),
            violations,
        }
    }

    /// Validate every topic in the ledger.
    pub fn validate_all(ledger: &TopicLedger) -> Vec<ValidationReport> {
        ledger.topics().map(Self::validate).collect()
    }
}
