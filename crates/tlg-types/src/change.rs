use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// How an observation relates to the previous observation of the same topic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// First observation of the topic.
    FirstSeen,
    /// Same content hash as the previous observation.
    Unchanged,
    /// Content hash differs from the previous observation.
    Modified,
}

impl ChangeType {
    /// The on-disk spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstSeen => "first_seen",
            Self::Unchanged => "unchanged",
            Self::Modified => "modified",
        }
    }

    /// Whether this observation counts towards `sentence_changed_count`.
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first_seen" => Ok(Self::FirstSeen),
            "unchanged" => Ok(Self::Unchanged),
            "modified" => Ok(Self::Modified),
            other => Err(TypeError::UnknownChangeType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_variants() {
        for ct in [ChangeType::FirstSeen, ChangeType::Unchanged, ChangeType::Modified] {
            assert_eq!(ct.as_str().parse::<ChangeType>().unwrap(), ct);
        }
    }

    #[test]
    fn rejects_unknown_spelling() {
        assert!("Modified".parse::<ChangeType>().is_err());
        assert!("changed".parse::<ChangeType>().is_err());
        assert!("".parse::<ChangeType>().is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&ChangeType::FirstSeen).unwrap();
        assert_eq!(json, "\"first_seen\"");
    }

    #[test]
    fn only_unchanged_is_not_a_change() {
        assert!(ChangeType::FirstSeen.is_change());
        assert!(ChangeType::Modified.is_change());
        assert!(!ChangeType::Unchanged.is_change());
    }
}
