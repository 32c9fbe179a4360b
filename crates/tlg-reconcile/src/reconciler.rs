use std::collections::BTreeMap;

use serde::Serialize;
use tlg_codec::Record;
use tlg_ledger::{TopicLedger, TopicValidator, ValidationReport};
use tlg_store::{Collection, CommitSummary, DocumentStore, StoreConfig, StoreError, WriteBatch};
use tlg_types::TopicKey;
use tracing::{debug, info, warn};

use crate::entry::{self, EntryDocument};
use crate::error::{EntrySkip, ReconcileResult};
use crate::topic_doc::{self, assign_slugs};

/// Counts describing one rebuild.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RebuildSummary {
    pub entries_scanned: usize,
    pub entries_replayed: usize,
    pub entries_patched: usize,
    /// Entries whose header could not be parsed; left untouched.
    pub malformed: usize,
    /// Entries without a usable date or topic; left untouched.
    pub missing_identity: usize,
    /// Entries whose stored `change_type` was not a known variant.
    pub invalid_change_type: usize,
    pub topics_total: usize,
    pub topics_written: usize,
    pub topics_deleted: usize,
    pub topics_unchanged: usize,
}

impl RebuildSummary {
    /// Whether the store already matched the replay.
    pub fn is_fixed_point(&self) -> bool {
        self.entries_patched == 0 && self.topics_written == 0 && self.topics_deleted == 0
    }
}

/// A computed rebuild that has not been written yet.
#[derive(Debug)]
pub struct RebuildPlan {
    pub summary: RebuildSummary,
    pub ledger: TopicLedger,
    /// Only the writes that change bytes in the store.
    pub batch: WriteBatch,
}

/// Result of checking stored topics and the rebuild fixed point.
#[derive(Debug)]
pub struct VerifyReport {
    pub reports: Vec<(String, ValidationReport)>,
    /// Topic documents that could not be parsed, with the reason.
    pub unreadable: Vec<(String, String)>,
    /// Writes a rebuild would still make.
    pub pending: RebuildSummary,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.unreadable.is_empty()
            && self.pending.is_fixed_point()
            && self.reports.iter().all(|(_, r)| r.is_valid())
    }
}

/// Full rebuild of derived state from the entry collection.
///
/// Every run starts from an empty [`TopicLedger`]; existing topic documents
/// are never consulted. All writes are staged and committed together at the
/// end, and a run on an already reconciled store writes nothing.
pub struct Reconciler<'s, S: DocumentStore + ?Sized> {
    store: &'s S,
    config: StoreConfig,
}

impl<'s, S: DocumentStore + ?Sized> Reconciler<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self::with_config(store, StoreConfig::default())
    }

    pub fn with_config(store: &'s S, config: StoreConfig) -> Self {
        Self { store, config }
    }

    /// Compute the rebuild without writing anything.
    pub fn plan(&self) -> ReconcileResult<RebuildPlan> {
        let mut summary = RebuildSummary::default();
        let mut docs = self.load_entries(&mut summary)?;

        docs.sort_by(|(a, _), (b, _)| {
            (a.observation.date, &a.name).cmp(&(b.observation.date, &b.name))
        });

        let mut ledger = TopicLedger::new();
        let mut metadata: BTreeMap<TopicKey, Record> = BTreeMap::new();
        let mut batch = WriteBatch::new();

        for (doc, text) in &docs {
            if doc.has_invalid_change_type() {
                summary.invalid_change_type += 1;
                warn!(
                    document = %doc.name,
                    change_type = ?doc.recorded_change_type,
                    "unknown change_type will be overwritten"
                );
            }

            let derived = ledger.replay(&doc.observation)?;
            summary.entries_replayed += 1;

            let patch = entry::patch(text, &derived);
            if patch.is_changed() {
                debug!(document = %doc.name, change_type = %derived.change_type, "entry patched");
                batch.put(Collection::Entries, doc.name.as_str(), patch.into_text());
                summary.entries_patched += 1;
            }
            metadata.insert(doc.observation.topic_key.clone(), doc.metadata.clone());
        }

        for name in self.store.list(Collection::Topics)? {
            batch.delete(Collection::Topics, name);
        }
        let slugs = assign_slugs(ledger.topics().map(|t| &t.key));
        let empty = Record::new();
        for topic in ledger.topics() {
            let name = self.config.file_name(&slugs[&topic.key]);
            let meta = metadata.get(&topic.key).unwrap_or(&empty);
            batch.put(Collection::Topics, name, topic_doc::render(topic, meta)?);
        }

        batch.prune(self.store)?;
        let topic_ops: CommitSummary = batch.counts_in(Collection::Topics);
        summary.topics_total = ledger.len();
        summary.topics_written = topic_ops.written;
        summary.topics_deleted = topic_ops.deleted;
        summary.topics_unchanged = summary.topics_total - topic_ops.written;

        Ok(RebuildPlan {
            summary,
            ledger,
            batch,
        })
    }

    /// Rebuild and commit.
    pub fn run(&self) -> ReconcileResult<RebuildSummary> {
        let plan = self.plan()?;
        let committed = plan.batch.commit(self.store)?;
        let summary = plan.summary;
        info!(
            entries = summary.entries_scanned,
            patched = summary.entries_patched,
            topics = summary.topics_total,
            written = committed.written,
            deleted = committed.deleted,
            malformed = summary.malformed,
            missing_identity = summary.missing_identity,
            "rebuild complete"
        );
        Ok(summary)
    }

    /// Validate every stored topic and check that a rebuild would be a no-op.
    pub fn verify(&self) -> ReconcileResult<VerifyReport> {
        let mut reports = Vec::new();
        let mut unreadable = Vec::new();
        for stored in topic_doc::load_topics(self.store)? {
            match stored.topic {
                Ok(topic) => reports.push((stored.name, TopicValidator::validate(&topic))),
                Err(e) => unreadable.push((stored.name, e.to_string())),
            }
        }
        let pending = self.plan()?.summary;
        Ok(VerifyReport {
            reports,
            unreadable,
            pending,
        })
    }

    fn load_entries(&self, summary: &mut RebuildSummary) -> ReconcileResult<Vec<(EntryDocument, String)>> {
        let mut docs = Vec::new();
        for name in self.store.list(Collection::Entries)? {
            summary.entries_scanned += 1;
            let text = match self.store.read(Collection::Entries, &name) {
                Ok(Some(text)) => text,
                Ok(None) => continue,
                Err(StoreError::InvalidUtf8 { .. }) => {
                    warn!(document = %name, "entry is not UTF-8, skipping");
                    summary.malformed += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            match entry::extract(&name, &text) {
                Ok(doc) => docs.push((doc, text)),
                Err(EntrySkip::Malformed(e)) => {
                    warn!(document = %name, error = %e, "malformed entry, skipping");
                    summary.malformed += 1;
                }
                Err(skip) => {
                    warn!(document = %name, reason = %skip, "entry lacks identity, skipping");
                    summary.missing_identity += 1;
                }
            }
        }
        Ok(docs)
    }
}
