use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FetchError, IngestResult};

/// What a fetcher returns for one article.
///
/// Only `title`, `summary_text`, `revision_id` and `trace_id` feed the
/// ledger; the rest is descriptive metadata copied onto the documents.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchedSummary {
    pub title: String,
    pub summary_text: String,
    pub revision_id: Option<i64>,
    pub trace_id: Option<String>,
    pub normalized_title: Option<String>,
    pub page_id: Option<i64>,
    pub wikibase_item: Option<String>,
    pub topic_url: Option<String>,
    pub language: Option<String>,
    pub namespace_id: Option<i64>,
    pub article_type: Option<String>,
    pub description: Option<String>,
}

/// Source of article summaries. Retries, if any, are the implementor's
/// business; an `Err` means the article is skipped.
pub trait Fetcher {
    fn fetch(&self, article: &str) -> Result<FetchedSummary, FetchError>;
}

/// Fetcher backed by a fixed map of article name to summary.
#[derive(Clone, Debug, Default)]
pub struct StaticFetcher {
    summaries: HashMap<String, FetchedSummary>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, article: impl Into<String>, summary: FetchedSummary) -> Self {
        self.summaries.insert(article.into(), summary);
        self
    }

    /// Parse a JSON object mapping article names to summaries.
    pub fn from_json(json: &str) -> IngestResult<Self> {
        let summaries: HashMap<String, FetchedSummary> = serde_json::from_str(json)?;
        Ok(Self { summaries })
    }

    pub fn load(path: &Path) -> IngestResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}

impl Fetcher for StaticFetcher {
    fn fetch(&self, article: &str) -> Result<FetchedSummary, FetchError> {
        self.summaries
            .get(article)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(article.to_string()))
    }
}
