use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::error::StoreResult;
use crate::traits::{validate_name, Collection, DocumentStore};

/// In-memory, `BTreeMap`-based document store.
///
/// Intended for tests and embedding. Counts every write and delete so callers
/// can assert that an operation left the store untouched.
pub struct InMemoryDocumentStore {
    documents: RwLock<BTreeMap<(Collection, String), String>>,
    mutations: AtomicU64,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(BTreeMap::new()),
            mutations: AtomicU64::new(0),
        }
    }

    /// Seed a document without counting it as a mutation.
    pub fn insert(&self, collection: Collection, name: impl Into<String>, contents: impl Into<String>) {
        self.documents
            .write()
            .expect("lock poisoned")
            .insert((collection, name.into()), contents.into());
    }

    /// Number of writes and deletes performed through the trait.
    pub fn mutations(&self) -> u64 {
        self.mutations.load(Ordering::SeqCst)
    }

    /// Number of documents in one collection.
    pub fn count(&self, collection: Collection) -> usize {
        self.documents
            .read()
            .expect("lock poisoned")
            .keys()
            .filter(|(c, _)| *c == collection)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn list(&self, collection: Collection) -> StoreResult<Vec<String>> {
        let map = self.documents.read().expect("lock poisoned");
        Ok(map
            .keys()
            .filter(|(c, _)| *c == collection)
            .map(|(_, name)| name.clone())
            .collect())
    }

    fn read(&self, collection: Collection, name: &str) -> StoreResult<Option<String>> {
        let map = self.documents.read().expect("lock poisoned");
        Ok(map.get(&(collection, name.to_string())).cloned())
    }

    fn write(&self, collection: Collection, name: &str, contents: &str) -> StoreResult<()> {
        validate_name(name)?;
        let mut map = self.documents.write().expect("lock poisoned");
        map.insert((collection, name.to_string()), contents.to_string());
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn delete(&self, collection: Collection, name: &str) -> StoreResult<bool> {
        let mut map = self.documents.write().expect("lock poisoned");
        let existed = map.remove(&(collection, name.to_string())).is_some();
        if existed {
            self.mutations.fetch_add(1, Ordering::SeqCst);
        }
        Ok(existed)
    }
}
