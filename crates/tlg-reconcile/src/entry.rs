//! Reading observations out of entry documents and writing derived fields
//! back into them.

use tlg_codec::{set_all, Header, Patch, Record, Scalar, Value};
use tlg_crypto::{ContentHasher, Fingerprint};
use tlg_ledger::{Derived, Observation};
use tlg_types::{parse_day, ChangeType, TopicKey};

use crate::error::EntrySkip;

/// Keys whose first present value identifies the topic.
pub const IDENTITY_KEYS: [&str; 3] = ["topic_key", "normalized_title", "topic_title"];

/// Descriptive keys copied from a topic's most recent entry onto its topic
/// document.
pub const CARRIED_KEYS: [&str; 10] = [
    "topic_page_id",
    "wikibase_item",
    "topic_url",
    "language",
    "namespace_id",
    "article_type",
    "description",
    "description_source",
    "canonical_title",
    "normalized_title",
];

/// An entry document reduced to what the rebuild needs.
#[derive(Clone, Debug, PartialEq)]
pub struct EntryDocument {
    pub name: String,
    pub observation: Observation,
    /// Values of [`CARRIED_KEYS`] present on the entry.
    pub metadata: Record,
    /// `change_type` as currently written, when present.
    pub recorded_change_type: Option<String>,
}

impl EntryDocument {
    /// Whether the stored `change_type` is present but not a known variant.
    pub fn has_invalid_change_type(&self) -> bool {
        self.recorded_change_type
            .as_deref()
            .is_some_and(|s| s.parse::<ChangeType>().is_err())
    }
}

/// Parse an entry document.
pub fn extract(name: &str, text: &str) -> Result<EntryDocument, EntrySkip> {
    let header = Header::parse(text)?;

    let date = header
        .text("date")
        .and_then(|s| parse_day(&s).ok())
        .ok_or(EntrySkip::MissingDate)?;

    let topic_key = IDENTITY_KEYS
        .iter()
        .filter_map(|key| header.text(key))
        .find_map(|s| TopicKey::new(&s).ok())
        .ok_or(EntrySkip::MissingTopic)?;

    let title = ["topic_title", "canonical_title", "normalized_title"]
        .iter()
        .find_map(|key| header.text(key))
        .unwrap_or_else(|| topic_key.as_str().to_string());

    let observed_text = header
        .text("lead_paragraph")
        .or_else(|| header.text("lead_sentence"));

    let content_hash = ["paragraph_hash", "sentence_hash"]
        .iter()
        .filter_map(|key| header.text(key))
        .find_map(|s| Fingerprint::from_hex(&s).ok())
        .or_else(|| observed_text.as_deref().map(ContentHasher::fingerprint));

    let int = |key: &str| header.get(key).and_then(Value::as_i64);

    let mut metadata = Record::new();
    for key in CARRIED_KEYS {
        if let Some(scalar) = header.get(key).and_then(Value::as_scalar) {
            if !scalar.is_null() {
                metadata.insert(key, scalar.clone());
            }
        }
    }

    Ok(EntryDocument {
        name: name.to_string(),
        observation: Observation {
            date,
            topic_key,
            title,
            rank: int("rank"),
            pageviews: int("pageviews"),
            observed_text,
            content_hash,
            source_revision_id: int("source_revision_id"),
        },
        metadata,
        recorded_change_type: header.text("change_type"),
    })
}

/// Header values for the derived fields, in the order they are written.
pub fn derived_fields(derived: &Derived) -> [(&'static str, Value); 5] {
    [
        ("times_seen_total", Value::from(derived.times_seen_total)),
        ("first_seen", Value::from(derived.first_seen.to_string())),
        ("days_since_last_seen", Value::from(derived.days_since_last_seen)),
        ("sentence_changed", Value::from(derived.sentence_changed)),
        ("change_type", Value::from(derived.change_type.as_str())),
    ]
}

/// Write derived fields into an entry. Other bytes are untouched; the
/// outcome says whether anything changed.
pub fn patch<'a>(text: &'a str, derived: &Derived) -> Patch<'a> {
    set_all(text, derived_fields(derived))
}

/// Scalar rendering of a carried key, for display.
pub fn carried_text(metadata: &Record, key: &str) -> Option<String> {
    metadata.get(key).and_then(Scalar::to_text).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use tlg_codec::{get, PatchOutcome};
    use tlg_types::parse_day;

    use super::*;

    const ENTRY: &str = "---\n\
date: \"2024-01-10\"\n\
topic_title: \"Example Topic\"\n\
normalized_title: \"Example_Topic\"\n\
rank: 3\n\
pageviews: 12000\n\
lead_sentence: \"Example Topic is a thing.\"\n\
source_revision_id: 42\n\
language: \"en\"\n\
description: null\n\
change_type: \"sorta\"\n\
---\n\
Body text.\n";

    #[test]
    fn extracts_fields() {
        let doc = extract("2024-01-10--example.md", ENTRY).unwrap();
        let obs = &doc.observation;
        assert_eq!(obs.date, parse_day("2024-01-10").unwrap());
        assert_eq!(obs.topic_key.as_str(), "example_topic");
        assert_eq!(obs.title, "Example Topic");
        assert_eq!(obs.rank, Some(3));
        assert_eq!(obs.pageviews, Some(12000));
        assert_eq!(obs.source_revision_id, Some(42));
        assert_eq!(obs.observed_text.as_deref(), Some("Example Topic is a thing."));
        assert_eq!(
            obs.content_hash,
            Some(ContentHasher::fingerprint("Example Topic is a thing."))
        );
        assert_eq!(carried_text(&doc.metadata, "language").as_deref(), Some("en"));
        assert!(doc.metadata.get("description").is_none());
        assert!(doc.has_invalid_change_type());
    }

    #[test]
    fn paragraph_wins_over_sentence() {
        let hash = ContentHasher::fingerprint("stored").to_hex();
        let text = format!(
            "---\ndate: \"2024-01-01\"\ntopic_key: \"x\"\nlead_sentence: \"s\"\nlead_paragraph: \"p\"\nsentence_hash: \"{hash}\"\n---\n"
        );
        let doc = extract("a.md", &text).unwrap();
        assert_eq!(doc.observation.observed_text.as_deref(), Some("p"));
        assert_eq!(doc.observation.content_hash.map(|h| h.to_hex()), Some(hash));
    }

    #[test]
    fn no_text_and_no_hash_means_no_hash() {
        let doc = extract("a.md", "---\ndate: \"2024-01-01\"\ntopic_title: \"x\"\n---\n").unwrap();
        assert_eq!(doc.observation.content_hash, None);
        assert_eq!(doc.recorded_change_type, None);
        assert!(!doc.has_invalid_change_type());
    }

    #[test]
    fn skips_documents_without_identity() {
        assert_eq!(
            extract("a.md", "---\ntopic_title: \"x\"\n---\n"),
            Err(EntrySkip::MissingDate)
        );
        assert_eq!(
            extract("a.md", "---\ndate: \"not a day\"\ntopic_title: \"x\"\n---\n"),
            Err(EntrySkip::MissingDate)
        );
        assert_eq!(
            extract("a.md", "---\ndate: \"2024-01-01\"\ntopic_title: \"  \"\n---\n"),
            Err(EntrySkip::MissingTopic)
        );
        assert!(matches!(
            extract("a.md", "no header here"),
            Err(EntrySkip::Malformed(_))
        ));
    }

    #[test]
    fn patch_writes_derived_fields_and_keeps_body() {
        let derived = Derived {
            times_seen_total: 2,
            first_seen: parse_day("2024-01-03").unwrap(),
            days_since_last_seen: Some(7),
            sentence_changed: true,
            change_type: ChangeType::Modified,
        };
        let patched = patch(ENTRY, &derived);
        assert_eq!(patched.outcome, PatchOutcome::Inserted);
        let text = patched.into_text();
        assert!(text.ends_with("---\nBody text.\n"));
        assert!(text.contains("first_seen: \"2024-01-03\"\n"));
        assert!(text.contains("change_type: \"modified\"\n"));
        assert!(!text.contains("sorta"));
        assert_eq!(get(&text, "days_since_last_seen").and_then(|v| v.as_i64()), Some(7));

        let again = patch(&text, &derived);
        assert_eq!(again.outcome, PatchOutcome::Unchanged);
    }

    #[test]
    fn first_observation_writes_null_gap() {
        let derived = Derived {
            times_seen_total: 1,
            first_seen: parse_day("2024-01-10").unwrap(),
            days_since_last_seen: None,
            sentence_changed: true,
            change_type: ChangeType::FirstSeen,
        };
        let text = patch(ENTRY, &derived).into_text();
        assert!(text.contains("days_since_last_seen: null\n"));
        assert!(get(&text, "days_since_last_seen").unwrap().is_null());
    }
}
