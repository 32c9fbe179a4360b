use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use tlg_codec::{DocumentBuilder, Header, Record};
use tlg_crypto::ContentHasher;
use tlg_ledger::{Derived, TopicLedger};
use tlg_reconcile::{assign_slugs, entry, load_topics, topic_doc};
use tlg_sample::sample_without_replacement;
use tlg_store::{Collection, DocumentStore, StoreConfig, StoreError, WriteBatch};
use tlg_types::{parse_day, Day, TopicKey};
use tracing::{debug, info, warn};

use crate::candidates::{prepare, weighted, Candidate};
use crate::config::IngestConfig;
use crate::error::{IngestError, IngestResult};
use crate::fetch::{FetchedSummary, Fetcher};
use crate::lead::{collapse_whitespace, first_declarative};

/// One entry produced by a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WrittenEntry {
    pub name: String,
    pub topic_document: String,
    pub topic_key: TopicKey,
    pub article: String,
    pub derived: Derived,
}

/// What a daily run did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DailyOutcome {
    /// An entry for the day already exists; nothing was written.
    AlreadyRan { date: Day },
    Written {
        date: Day,
        seed: u64,
        attempts: usize,
        entries: Vec<WrittenEntry>,
    },
}

/// The run seed for a day: the date as the integer `YYYYMMDD`.
pub fn seed_for(date: Day) -> u64 {
    date.year() as u64 * 10_000 + u64::from(date.month()) * 100 + u64::from(date.day())
}

/// What an entry is rendered from.
#[derive(Clone, Copy)]
struct EntryDraft<'a> {
    candidate: &'a Candidate,
    summary: &'a FetchedSummary,
    title: &'a str,
    key: &'a TopicKey,
    sentence: &'a str,
}

/// A candidate appended to the ledger, waiting for its document names.
struct Accepted {
    article: String,
    key: TopicKey,
    text: String,
    metadata: Record,
    derived: Derived,
}

fn slug_of<'s>(slugs: &'s BTreeMap<TopicKey, String>, key: &TopicKey) -> IngestResult<&'s str> {
    slugs
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| IngestError::Unreadable {
            name: key.to_string(),
            reason: "no document name assigned".into(),
        })
}

/// Incremental path: pick candidates, fetch them, append to their topics.
///
/// Existing topic documents are the starting state, so appends are strict: a
/// topic whose last entry is on or after the run date fails the run.
pub struct DailyRun<'a, S: DocumentStore + ?Sized, F: Fetcher + ?Sized> {
    store: &'a S,
    fetcher: &'a F,
    config: IngestConfig,
    store_config: StoreConfig,
}

impl<'a, S: DocumentStore + ?Sized, F: Fetcher + ?Sized> DailyRun<'a, S, F> {
    pub fn new(store: &'a S, fetcher: &'a F) -> Self {
        Self {
            store,
            fetcher,
            config: IngestConfig::default(),
            store_config: StoreConfig::default(),
        }
    }

    pub fn with_config(mut self, config: IngestConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_store_config(mut self, store_config: StoreConfig) -> Self {
        self.store_config = store_config;
        self
    }

    pub fn run(&self, date: Day, candidates: Vec<Candidate>) -> IngestResult<DailyOutcome> {
        self.run_at(date, Utc::now(), candidates)
    }

    /// Same as [`DailyRun::run`] with a fixed fetch timestamp.
    pub fn run_at(
        &self,
        date: Day,
        now: DateTime<Utc>,
        candidates: Vec<Candidate>,
    ) -> IngestResult<DailyOutcome> {
        if self.has_entry_for(date)? {
            info!(%date, "entry for today already exists, aborting");
            return Ok(DailyOutcome::AlreadyRan { date });
        }

        let pool = prepare(candidates, self.config.candidate_limit);
        if pool.is_empty() {
            return Err(IngestError::NoCandidates(date));
        }
        let seed = seed_for(date);
        let size = pool.len();
        let order = sample_without_replacement(weighted(pool), size, seed)?;
        debug!(seed, candidates = size, "candidate order sampled");

        let mut stored_names: BTreeMap<TopicKey, String> = BTreeMap::new();
        let mut unreadable = BTreeSet::new();
        let mut topics = Vec::new();
        for stored in load_topics(self.store)? {
            match stored.topic {
                Ok(topic) => {
                    stored_names.insert(topic.key.clone(), stored.name);
                    topics.push(topic);
                }
                Err(_) => {
                    unreadable.insert(stored.name);
                }
            }
        }
        let mut ledger = TopicLedger::from_topics(topics);

        let mut accepted: Vec<Accepted> = Vec::new();
        let mut attempts = 0;

        for candidate in order {
            if accepted.len() >= self.config.picks_per_run || attempts >= self.config.max_attempts {
                break;
            }
            attempts += 1;

            let summary = match self.fetcher.fetch(&candidate.article) {
                Ok(summary) => summary,
                Err(e) => {
                    warn!(article = %candidate.article, error = %e, "fetch failed, trying next");
                    continue;
                }
            };
            let Some(sentence) = first_declarative(&summary.summary_text, self.config.min_sentence_chars)
            else {
                warn!(article = %candidate.article, "no usable lead sentence, trying next");
                continue;
            };

            let title = display_title(&candidate, &summary);
            let normalized = summary.normalized_title.clone().unwrap_or_else(|| title.clone());
            let key = TopicKey::new(&normalized)?;
            if accepted.iter().any(|a| a.key == key) {
                debug!(topic = %key, "topic already written this run");
                continue;
            }

            let draft = self.render_entry(
                date,
                now,
                &EntryDraft {
                    candidate: &candidate,
                    summary: &summary,
                    title: &title,
                    key: &key,
                    sentence: &sentence,
                },
            )?;
            let doc = entry::extract(&candidate.article, &draft).map_err(|e| IngestError::Unreadable {
                name: candidate.article.clone(),
                reason: e.to_string(),
            })?;
            let derived = ledger.append(&doc.observation)?;
            info!(
                article = %candidate.article,
                topic = %key,
                change_type = %derived.change_type,
                "candidate accepted"
            );
            accepted.push(Accepted {
                text: entry::patch(&draft, &derived).into_text(),
                article: candidate.article,
                key,
                metadata: doc.metadata,
                derived,
            });
        }

        if accepted.is_empty() {
            return Err(IngestError::Exhausted { attempts });
        }

        // Names follow the rebuild: slugs assigned over every key in key order.
        let slugs = assign_slugs(ledger.topics().map(|t| &t.key));
        let mut batch = WriteBatch::new();
        let mut moved = Vec::new();
        for (key, old) in &stored_names {
            let name = self.store_config.file_name(slug_of(&slugs, key)?);
            if *old != name {
                batch.delete(Collection::Topics, old.as_str());
                moved.push((key, old, name));
            }
        }
        for (key, old, name) in moved {
            if accepted.iter().any(|a| &a.key == key) {
                continue;
            }
            if let Some(text) = self.store.read(Collection::Topics, old)? {
                info!(from = %old, to = %name, "topic document renamed");
                batch.put(Collection::Topics, name, text);
            }
        }

        let mut entries = Vec::new();
        for a in accepted {
            let slug = slug_of(&slugs, &a.key)?;
            let topic_document = self.store_config.file_name(slug);
            let name = self.store_config.file_name(&format!("{date}--{slug}"));
            let topic = ledger.get(&a.key).ok_or_else(|| IngestError::Unreadable {
                name: topic_document.clone(),
                reason: "topic missing after append".into(),
            })?;
            if unreadable.contains(&topic_document) {
                warn!(document = %topic_document, "replacing unreadable topic document");
            }
            batch.put(Collection::Entries, name.as_str(), a.text);
            batch.put(
                Collection::Topics,
                topic_document.as_str(),
                topic_doc::render(topic, &a.metadata)?,
            );
            debug!(entry = %name, topic = %a.key, "entry staged");
            entries.push(WrittenEntry {
                name,
                topic_document,
                topic_key: a.key,
                article: a.article,
                derived: a.derived,
            });
        }

        let committed = batch.commit(self.store)?;
        info!(
            %date,
            entries = entries.len(),
            attempts,
            written = committed.written,
            "daily run complete"
        );
        Ok(DailyOutcome::Written {
            date,
            seed,
            attempts,
            entries,
        })
    }

    fn has_entry_for(&self, date: Day) -> IngestResult<bool> {
        for name in self.store.list(Collection::Entries)? {
            let text = match self.store.read(Collection::Entries, &name) {
                Ok(Some(text)) => text,
                Ok(None) => continue,
                Err(StoreError::InvalidUtf8 { .. }) => {
                    warn!(document = %name, "entry is not UTF-8, skipping");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            let dated = Header::parse(&text)
                .ok()
                .and_then(|h| h.text("date"))
                .and_then(|d| parse_day(&d).ok());
            if dated == Some(date) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn render_entry(&self, date: Day, now: DateTime<Utc>, draft: &EntryDraft<'_>) -> IngestResult<String> {
        let EntryDraft {
            candidate,
            summary,
            title,
            key,
            sentence,
        } = *draft;
        let paragraph = collapse_whitespace(&summary.summary_text);
        let description_source = summary.description.as_ref().map(|_| "summary");

        let text = DocumentBuilder::new()
            .field("layout", "entry")
            .field("title", title)
            .field("date", date.to_string())
            .field("topic_title", title)
            .field("topic_key", key.as_str())
            .field("topic_page_id", summary.page_id)
            .field("wikibase_item", summary.wikibase_item.clone())
            .field("topic_url", summary.topic_url.clone())
            .field("language", summary.language.clone())
            .field("namespace_id", summary.namespace_id.unwrap_or(0))
            .field("article_type", summary.article_type.clone())
            .field("description", summary.description.clone())
            .field("description_source", description_source)
            .field("canonical_title", title)
            .field("normalized_title", summary.normalized_title.clone().unwrap_or_else(|| title.to_string()))
            .field("rank", candidate.rank)
            .field("pageviews", candidate.views)
            .field("lead_sentence", sentence)
            .field("sentence_hash", ContentHasher::fingerprint(sentence).to_hex())
            .field("sentence_length", ContentHasher::length(sentence) as i64)
            .field("lead_paragraph", paragraph.as_str())
            .field("paragraph_hash", ContentHasher::fingerprint(&paragraph).to_hex())
            .field("paragraph_length", ContentHasher::length(&paragraph) as i64)
            .field("source_revision_id", summary.revision_id)
            .field("fetch_timestamp", now.format("%Y-%m-%dT%H:%M:%SZ").to_string())
            .field("request_trace_id", summary.trace_id.clone())
            .field("agent_name", self.config.agent_name.as_str())
            .field("agent_version", self.config.agent_version.as_str())
            .render()?;
        Ok(text)
    }
}

fn display_title(candidate: &Candidate, summary: &FetchedSummary) -> String {
    let title = summary.title.trim();
    if title.is_empty() {
        candidate.article.replace('_', " ")
    } else {
        title.to_string()
    }
}
