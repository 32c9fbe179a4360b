use crate::error::CodecResult;
use crate::layout::{field_spans, scan};
use crate::value::{Record, Value};

/// Parsed header block of a document, in document order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Header {
    fields: Vec<(String, Value)>,
}

impl Header {
    /// Parse the header of `doc`. Lines that are not `key: value` pairs are
    /// skipped.
    pub fn parse(doc: &str) -> CodecResult<Self> {
        Self::split(doc).map(|(header, _)| header)
    }

    /// Parse the header and return it with the body that follows the closing
    /// delimiter.
    pub fn split(doc: &str) -> CodecResult<(Self, &str)> {
        let layout = scan(doc)?;
        let fields = field_spans(&layout)
            .iter()
            .map(|span| (span.key.to_string(), span.value()))
            .collect();
        Ok((Self { fields }, &doc[layout.body_start..]))
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// First of `keys` that is present and not null.
    pub fn first_of(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .filter_map(|k| self.get(k))
            .find(|v| !v.is_null())
    }

    /// Non-empty text for `key`, whatever scalar type it was written as.
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key)
            .and_then(Value::to_text)
            .filter(|s| !s.is_empty())
    }

    pub fn list(&self, key: &str) -> Option<&[Record]> {
        self.get(key).and_then(Value::as_list)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Value of `key` in `doc`, or `None` when the key is absent or the document
/// is malformed.
pub fn get(doc: &str, key: &str) -> Option<Value> {
    Header::parse(doc).ok()?.get(key).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use crate::value::Scalar;

    const ENTRY: &str = "---\n\
layout: \"entry\"\n\
date: \"2024-01-10\"\n\
rank: 4\n\
pageviews: 120345\n\
days_since_last_seen: null\n\
sentence_changed: true\n\
lead_sentence: \"Rust is a \\\"systems\\\" language.\"\n\
---\n\
Body text.\n";

    #[test]
    fn parse_typed_fields() {
        let h = Header::parse(ENTRY).unwrap();
        assert_eq!(h.len(), 7);
        assert_eq!(h.get("rank"), Some(&Value::Scalar(Scalar::Int(4))));
        assert_eq!(h.get("date").and_then(Value::as_str), Some("2024-01-10"));
        assert!(h.get("days_since_last_seen").unwrap().is_null());
        assert_eq!(h.get("sentence_changed").and_then(Value::as_bool), Some(true));
        assert_eq!(
            h.get("lead_sentence").and_then(Value::as_str),
            Some("Rust is a \"systems\" language.")
        );
    }

    #[test]
    fn split_returns_body() {
        let (_, body) = Header::split(ENTRY).unwrap();
        assert_eq!(body, "Body text.\n");
    }

    #[test]
    fn parse_history_list() {
        let doc = "---\n\
topic_title: \"Example\"\n\
history:\n  - date: \"2024-01-01\"\n    rank: 2\n    change_type: \"first_seen\"\n  - date: \"2024-01-03\"\n    rank: 5\n\
---\n";
        let h = Header::parse(doc).unwrap();
        let items = h.list("history").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get("rank"), Some(&Scalar::Int(2)));
        assert_eq!(items[1].get("date").and_then(Scalar::as_str), Some("2024-01-03"));
        assert_eq!(items[1].get("change_type"), None);
    }

    #[test]
    fn empty_list_literal() {
        let h = Header::parse("---\nhistory: []\n---\n").unwrap();
        assert_eq!(h.list("history"), Some(&[][..]));
    }

    #[test]
    fn skips_unrecognized_lines() {
        let h = Header::parse("---\n# comment\nnot a pair\nkey: 1\n---\n").unwrap();
        assert_eq!(h.keys().collect::<Vec<_>>(), vec!["key"]);
    }

    #[test]
    fn first_duplicate_wins() {
        let h = Header::parse("---\nk: 1\nk: 2\n---\n").unwrap();
        assert_eq!(h.get("k").and_then(Value::as_i64), Some(1));
    }

    #[test]
    fn first_of_skips_missing_and_null() {
        let h = Header::parse("---\nlead_paragraph: null\nlead_sentence: \"s\"\n---\n").unwrap();
        let v = h.first_of(&["lead_paragraph", "lead_sentence"]).unwrap();
        assert_eq!(v.as_str(), Some("s"));
    }

    #[test]
    fn text_view_of_bare_values() {
        let h = Header::parse("---\ndate: 2024-01-10\nid: 77\nblank: \"\"\n---\n").unwrap();
        assert_eq!(h.text("date").as_deref(), Some("2024-01-10"));
        assert_eq!(h.text("id").as_deref(), Some("77"));
        assert_eq!(h.text("blank"), None);
    }

    #[test]
    fn crlf_documents_parse() {
        let h = Header::parse("---\r\na: \"x\"\r\n---\r\n").unwrap();
        assert_eq!(h.get("a").and_then(Value::as_str), Some("x"));
    }

    #[test]
    fn malformed_documents() {
        assert_eq!(Header::parse("no header"), Err(CodecError::MissingOpenDelimiter));
        assert_eq!(Header::parse("---\na: 1\n"), Err(CodecError::UnclosedHeader));
        assert_eq!(get("---\na: 1\n", "a"), None);
    }
}
