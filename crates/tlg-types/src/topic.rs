use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Normalized, case-insensitive identity of a topic.
///
/// Two titles that differ only in letter case refer to the same topic. The
/// key is stored lower-cased; the original spelling lives on the documents.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TopicKey(String);

impl TopicKey {
    /// Normalize a title into a key. Fails on titles that are empty after
    /// trimming.
    pub fn new(title: &str) -> Result<Self, TypeError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(TypeError::EmptyTopicKey);
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File-system safe slug of this key.
    pub fn slug(&self) -> String {
        slugify(&self.0)
    }
}

impl fmt::Debug for TopicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TopicKey({:?})", self.0)
    }
}

impl fmt::Display for TopicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TopicKey {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<TopicKey> for String {
    fn from(key: TopicKey) -> Self {
        key.0
    }
}

/// Lower-case `s`, collapse every run of characters outside `[a-z0-9]` into a
/// single `-`, and trim dashes from both ends. Returns `"topic"` when nothing
/// is left.
pub fn slugify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_dash = false;
    for ch in s.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch);
        } else {
            pending_dash = true;
        }
    }
    if out.is_empty() {
        "topic".to_string()
    } else {
        out
    }
}
