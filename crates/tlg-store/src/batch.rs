use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::traits::{validate_name, Collection, DocumentStore};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Staged {
    Put(String),
    Delete,
}

/// Counts of what a commit actually changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    pub written: usize,
    pub deleted: usize,
}

impl CommitSummary {
    pub fn is_empty(&self) -> bool {
        self.written == 0 && self.deleted == 0
    }
}

/// Writes staged in memory and applied to a store in one pass.
///
/// Each document has at most one staged operation; the last one staged wins,
/// so deleting every topic and then putting the regenerated ones leaves only
/// the puts for names that survive. On commit, puts are applied before
/// deletes.
#[derive(Clone, Debug, Default)]
pub struct WriteBatch {
    ops: BTreeMap<(Collection, String), Staged>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, collection: Collection, name: impl Into<String>, contents: impl Into<String>) {
        self.ops
            .insert((collection, name.into()), Staged::Put(contents.into()));
    }

    pub fn delete(&mut self, collection: Collection, name: impl Into<String>) {
        self.ops.insert((collection, name.into()), Staged::Delete);
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of staged puts and deletes.
    pub fn counts(&self) -> CommitSummary {
        let written = self
            .ops
            .values()
            .filter(|op| matches!(op, Staged::Put(_)))
            .count();
        CommitSummary {
            written,
            deleted: self.ops.len() - written,
        }
    }

    /// Staged puts and deletes within one collection.
    pub fn counts_in(&self, collection: Collection) -> CommitSummary {
        let mut summary = CommitSummary::default();
        for ((c, _), op) in &self.ops {
            if *c != collection {
                continue;
            }
            match op {
                Staged::Put(_) => summary.written += 1,
                Staged::Delete => summary.deleted += 1,
            }
        }
        summary
    }

    /// Staged contents for a document, if a put is staged.
    pub fn staged(&self, collection: Collection, name: &str) -> Option<&str> {
        match self.ops.get(&(collection, name.to_string())) {
            Some(Staged::Put(contents)) => Some(contents),
            _ => None,
        }
    }

    /// Drop operations that would not change the store: puts equal to the
    /// stored bytes and deletes of missing documents.
    pub fn prune<S: DocumentStore + ?Sized>(&mut self, store: &S) -> StoreResult<()> {
        let mut noop = Vec::new();
        for ((collection, name), op) in &self.ops {
            let current = match store.read(*collection, name) {
                Ok(current) => current,
                // Undecodable bytes exist and never equal a staged put.
                Err(StoreError::InvalidUtf8 { .. }) => continue,
                Err(e) => return Err(e),
            };
            let unchanged = match op {
                Staged::Put(contents) => current.as_deref() == Some(contents.as_str()),
                Staged::Delete => current.is_none(),
            };
            if unchanged {
                noop.push((*collection, name.clone()));
            }
        }
        for key in noop {
            self.ops.remove(&key);
        }
        Ok(())
    }

    /// Validate every name, prune no-ops, then apply puts followed by deletes.
    pub fn commit<S: DocumentStore + ?Sized>(mut self, store: &S) -> StoreResult<CommitSummary> {
        for (_, name) in self.ops.keys() {
            validate_name(name)?;
        }
        self.prune(store)?;

        let mut summary = CommitSummary::default();
        for ((collection, name), op) in &self.ops {
            if let Staged::Put(contents) = op {
                store.write(*collection, name, contents)?;
                summary.written += 1;
            }
        }
        for ((collection, name), op) in &self.ops {
            if let Staged::Delete = op {
                if store.delete(*collection, name)? {
                    summary.deleted += 1;
                }
                debug!(%collection, name = %name, "staged delete applied");
            }
        }

        info!(
            written = summary.written,
            deleted = summary.deleted,
            "write batch committed"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use crate::memory::InMemoryDocumentStore;

    use super::*;

    #[test]
    fn later_put_overrides_delete() {
        let store = InMemoryDocumentStore::new();
        store.insert(Collection::Topics, "a.md", "old");

        let mut batch = WriteBatch::new();
        batch.delete(Collection::Topics, "a.md");
        batch.put(Collection::Topics, "a.md", "new");
        let summary = batch.commit(&store).unwrap();

        assert_eq!(summary, CommitSummary { written: 1, deleted: 0 });
        assert_eq!(store.read(Collection::Topics, "a.md").unwrap().as_deref(), Some("new"));
    }

    #[test]
    fn identical_put_is_dropped() {
        let store = InMemoryDocumentStore::new();
        store.insert(Collection::Entries, "e.md", "same");

        let mut batch = WriteBatch::new();
        batch.put(Collection::Entries, "e.md", "same");
        let summary = batch.commit(&store).unwrap();

        assert!(summary.is_empty());
        assert_eq!(store.mutations(), 0);
    }

    #[test]
    fn prune_reports_real_changes() {
        let store = InMemoryDocumentStore::new();
        store.insert(Collection::Topics, "keep.md", "k");
        store.insert(Collection::Topics, "gone.md", "g");

        let mut batch = WriteBatch::new();
        batch.put(Collection::Topics, "keep.md", "k");
        batch.delete(Collection::Topics, "gone.md");
        batch.delete(Collection::Topics, "missing.md");
        batch.put(Collection::Topics, "fresh.md", "f");
        batch.prune(&store).unwrap();

        assert_eq!(batch.counts(), CommitSummary { written: 1, deleted: 1 });
        assert_eq!(batch.staged(Collection::Topics, "fresh.md"), Some("f"));
        assert_eq!(store.mutations(), 0);
    }

    #[test]
    fn invalid_name_aborts_before_any_write() {
        let store = InMemoryDocumentStore::new();
        let mut batch = WriteBatch::new();
        batch.put(Collection::Entries, "ok.md", "x");
        batch.put(Collection::Entries, "../bad.md", "x");
        assert!(batch.commit(&store).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn empty_batch_commits_nothing() {
        let store = InMemoryDocumentStore::new();
        let summary = WriteBatch::new().commit(&store).unwrap();
        assert!(summary.is_empty());
    }

    #[test]
    fn undecodable_document_is_still_replaced_and_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let store = crate::fs::FsDocumentStore::new(dir.path(), Default::default());
        let topics = dir.path().join("_topics");
        std::fs::create_dir_all(&topics).unwrap();
        std::fs::write(topics.join("bad.md"), [0xff, 0xfe]).unwrap();
        std::fs::write(topics.join("stale.md"), [0xff, 0xfe]).unwrap();

        let mut batch = WriteBatch::new();
        batch.put(Collection::Topics, "bad.md", "fixed");
        batch.delete(Collection::Topics, "stale.md");
        let summary = batch.commit(&store).unwrap();

        assert_eq!(summary, CommitSummary { written: 1, deleted: 1 });
        assert_eq!(store.read(Collection::Topics, "bad.md").unwrap().as_deref(), Some("fixed"));
        assert!(!topics.join("stale.md").exists());
    }
}
