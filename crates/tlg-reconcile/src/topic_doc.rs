//! Topic documents: rendering a [`Topic`] and reading one back.

use std::collections::{BTreeMap, BTreeSet};

use tlg_codec::{DocumentBuilder, Header, Record, Scalar, Value};
use tlg_crypto::Fingerprint;
use tlg_ledger::{HistoryItem, Topic};
use tlg_store::{Collection, DocumentStore, StoreConfig, StoreError};
use tlg_types::{parse_day, ChangeType, TopicKey};
use tracing::warn;

use crate::entry::{carried_text, CARRIED_KEYS};
use crate::error::{ReconcileError, ReconcileResult};

/// Render a topic document. `metadata` holds the carried keys of the topic's
/// most recent entry.
pub fn render(topic: &Topic, metadata: &Record) -> ReconcileResult<String> {
    let title = carried_text(metadata, "canonical_title").unwrap_or_else(|| topic.title.clone());

    let mut doc = DocumentBuilder::new()
        .field("layout", "topic")
        .field("title", title)
        .field("topic_key", topic.key.as_str())
        .field("topic_title", topic.title.as_str());
    for key in CARRIED_KEYS {
        if let Some(scalar) = metadata.get(key) {
            doc = doc.field(key, scalar.clone());
        }
    }

    let history: Vec<Record> = topic.history.iter().map(history_record).collect();
    let text = doc
        .field("times_seen_total", topic.times_seen_total)
        .field("sentence_changed_count", topic.sentence_changed_count)
        .field("history", history)
        .render()?;
    Ok(text)
}

fn history_record(item: &HistoryItem) -> Record {
    Record::new()
        .with("date", item.date.to_string())
        .with("rank", item.rank)
        .with("pageviews", item.pageviews)
        .with("lead_sentence", item.observed_text.clone())
        .with("content_hash", item.content_hash.map(|h| h.to_hex()))
        .with("change_type", item.change_type.as_str())
        .with("source_revision_id", item.source_revision_id)
}

/// Read a topic document back into a [`Topic`].
pub fn parse(text: &str) -> ReconcileResult<Topic> {
    let header = Header::parse(text)?;

    let key = header
        .text("topic_key")
        .or_else(|| header.text("topic_title"))
        .ok_or_else(|| invalid("missing topic_key"))?;
    let key = TopicKey::new(&key)?;
    let title = header
        .text("topic_title")
        .unwrap_or_else(|| key.as_str().to_string());

    let count = |field: &str| -> ReconcileResult<u32> {
        header
            .get(field)
            .and_then(Value::as_i64)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| invalid(format!("missing or invalid {field}")))
    };

    let history = header
        .list("history")
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(index, record)| history_item(index, record))
        .collect::<ReconcileResult<Vec<_>>>()?;

    Ok(Topic {
        key,
        title,
        times_seen_total: count("times_seen_total")?,
        sentence_changed_count: count("sentence_changed_count")?,
        history,
    })
}

fn history_item(index: usize, record: &Record) -> ReconcileResult<HistoryItem> {
    let text = |field: &str| record.get(field).and_then(Scalar::to_text);
    let int = |field: &str| record.get(field).and_then(Scalar::as_i64);

    let date = text("date")
        .ok_or_else(|| invalid(format!("history[{index}] has no date")))
        .and_then(|s| Ok(parse_day(&s)?))?;
    let change_type = text("change_type")
        .ok_or_else(|| invalid(format!("history[{index}] has no change_type")))
        .and_then(|s| Ok(s.parse::<ChangeType>()?))?;
    let content_hash = match text("content_hash").filter(|s| !s.is_empty()) {
        Some(hex) => Some(
            Fingerprint::from_hex(&hex)
                .map_err(|e| invalid(format!("history[{index}]: {e}")))?,
        ),
        None => None,
    };

    Ok(HistoryItem {
        date,
        rank: int("rank"),
        pageviews: int("pageviews"),
        observed_text: record.get("lead_sentence").and_then(|s| s.as_str()).map(str::to_string),
        content_hash,
        change_type,
        source_revision_id: int("source_revision_id"),
    })
}

fn invalid(reason: impl Into<String>) -> ReconcileError {
    ReconcileError::InvalidTopicDocument(reason.into())
}

/// Pick a unique slug for each key, in key order. Collisions get `-2`, `-3`,
/// and so on.
pub fn assign_slugs<'a>(keys: impl IntoIterator<Item = &'a TopicKey>) -> BTreeMap<TopicKey, String> {
    let mut used = BTreeSet::new();
    let mut sorted: Vec<&TopicKey> = keys.into_iter().collect();
    sorted.sort();
    sorted.dedup();

    sorted
        .into_iter()
        .map(|key| {
            let slug = unique_slug(&key.slug(), &used);
            used.insert(slug.clone());
            (key.clone(), slug)
        })
        .collect()
}

/// `base` if unused, else the first free `base-N` for N >= 2.
pub fn unique_slug(base: &str, used: &BTreeSet<String>) -> String {
    if !used.contains(base) {
        return base.to_string();
    }
    (2u32..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// A topic document as found in the store.
#[derive(Debug)]
pub struct StoredTopic {
    pub name: String,
    pub topic: ReconcileResult<Topic>,
}

/// Load and parse every topic document. Documents that fail to parse are
/// returned with their error so callers can report them.
pub fn load_topics<S: DocumentStore + ?Sized>(store: &S) -> ReconcileResult<Vec<StoredTopic>> {
    let mut loaded = Vec::new();
    for name in store.list(Collection::Topics)? {
        let topic = match store.read(Collection::Topics, &name) {
            Ok(Some(text)) => parse(&text),
            Ok(None) => continue,
            Err(e @ StoreError::InvalidUtf8 { .. }) => Err(e.into()),
            Err(e) => return Err(e.into()),
        };
        if let Err(e) = &topic {
            warn!(document = %name, error = %e, "unreadable topic document");
        }
        loaded.push(StoredTopic { name, topic });
    }
    Ok(loaded)
}

/// Find the stored topic for `query`, matched by key or by document stem.
pub fn find_topic<S: DocumentStore + ?Sized>(
    store: &S,
    config: &StoreConfig,
    query: &str,
) -> ReconcileResult<Option<(String, Topic)>> {
    let key = TopicKey::new(query)?;
    let stem_name = config.file_name(query);
    for stored in load_topics(store)? {
        if let Ok(topic) = stored.topic {
            if topic.key == key || stored.name == stem_name {
                return Ok(Some((stored.name, topic)));
            }
        }
    }
    Ok(None)
}
