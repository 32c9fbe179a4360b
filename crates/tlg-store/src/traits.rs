use std::fmt;

use crate::error::{StoreError, StoreResult};

/// The two document collections of a ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Entries,
    Topics,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entries => "entries",
            Self::Topics => "topics",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named text documents grouped into collections.
///
/// Implementations must satisfy these invariants:
/// - `list` returns names sorted ascending.
/// - `read` of a missing document is `Ok(None)`, not an error.
/// - `write` replaces the whole document.
/// - All I/O errors are propagated, never silently ignored.
pub trait DocumentStore: Send + Sync {
    /// Names of every document in the collection, sorted.
    fn list(&self, collection: Collection) -> StoreResult<Vec<String>>;

    fn read(&self, collection: Collection, name: &str) -> StoreResult<Option<String>>;

    fn write(&self, collection: Collection, name: &str, contents: &str) -> StoreResult<()>;

    /// Returns `true` if the document existed.
    fn delete(&self, collection: Collection, name: &str) -> StoreResult<bool>;

    fn exists(&self, collection: Collection, name: &str) -> StoreResult<bool> {
        Ok(self.read(collection, name)?.is_some())
    }

    /// Read a document that must exist.
    fn read_required(&self, collection: Collection, name: &str) -> StoreResult<String> {
        self.read(collection, name)?.ok_or_else(|| StoreError::NotFound {
            collection,
            name: name.to_string(),
        })
    }
}

/// Reject names that could escape the collection directory.
pub fn validate_name(name: &str) -> StoreResult<()> {
    let bad = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0']);
    if bad {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}
