use serde::{Deserialize, Serialize};

use crate::traits::Collection;

/// Where documents live, relative to the ledger root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub entries_dir: String,
    pub topics_dir: String,
    /// File extension of documents, without the dot.
    pub extension: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            entries_dir: "_entries".into(),
            topics_dir: "_topics".into(),
            extension: "md".into(),
        }
    }
}

impl StoreConfig {
    pub fn dir(&self, collection: Collection) -> &str {
        match collection {
            Collection::Entries => &self.entries_dir,
            Collection::Topics => &self.topics_dir,
        }
    }

    /// File name for a document stem, e.g. `rust` -> `rust.md`.
    pub fn file_name(&self, stem: &str) -> String {
        format!("{stem}.{}", self.extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.dir(Collection::Entries), "_entries");
        assert_eq!(config.dir(Collection::Topics), "_topics");
        assert_eq!(config.file_name("rust"), "rust.md");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: StoreConfig = toml::from_str("topics_dir = \"topics\"").unwrap();
        assert_eq!(config.topics_dir, "topics");
        assert_eq!(config.entries_dir, "_entries");
        assert_eq!(config.extension, "md");
    }
}
