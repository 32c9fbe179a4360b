use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::IngestResult;

/// One row of the daily top list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub article: String,
    pub rank: i64,
    #[serde(default)]
    pub views: i64,
}

impl Candidate {
    /// Sampling weight: `1 / max(1, rank)`.
    pub fn weight(&self) -> f64 {
        1.0 / self.rank.max(1) as f64
    }
}

const EXCLUDED_PREFIXES: [&str; 4] = ["Special:", "File:", "Talk:", "User:"];

/// Whether an article is an ordinary content page.
pub fn is_ordinary(article: &str) -> bool {
    article != "Main_Page" && !EXCLUDED_PREFIXES.iter().any(|p| article.starts_with(p))
}

/// Filter to ordinary articles and keep the first `limit`.
pub fn prepare(candidates: Vec<Candidate>, limit: usize) -> Vec<Candidate> {
    candidates
        .into_iter()
        .filter(|c| is_ordinary(&c.article))
        .take(limit)
        .collect()
}

/// Pair each candidate with its weight, in list order.
pub fn weighted(candidates: Vec<Candidate>) -> Vec<(Candidate, f64)> {
    candidates
        .into_iter()
        .map(|c| {
            let w = c.weight();
            (c, w)
        })
        .collect()
}

/// Parse a JSON array of candidates.
pub fn from_json(json: &str) -> IngestResult<Vec<Candidate>> {
    Ok(serde_json::from_str(json)?)
}

pub fn load(path: &Path) -> IngestResult<Vec<Candidate>> {
    let json = std::fs::read_to_string(path)?;
    from_json(&json)
}
