use std::borrow::Cow;

use crate::error::CodecError;
use crate::layout::{field_spans, is_valid_key, scan};
use crate::value::Value;

/// What [`set`] did to a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatchOutcome {
    /// An existing key was rewritten.
    Replaced,
    /// The key was appended before the closing delimiter.
    Inserted,
    /// The document already held exactly this value.
    Unchanged,
    /// The document (or the key) could not be patched; text is untouched.
    Malformed(CodecError),
}

/// Result of patching a document. Borrowed when nothing changed.
#[derive(Clone, Debug)]
pub struct Patch<'a> {
    pub text: Cow<'a, str>,
    pub outcome: PatchOutcome,
}

impl<'a> Patch<'a> {
    fn untouched(doc: &'a str, outcome: PatchOutcome) -> Self {
        Self {
            text: Cow::Borrowed(doc),
            outcome,
        }
    }

    /// Whether the text differs from the input. Callers write back only when
    /// this is `true`.
    pub fn is_changed(&self) -> bool {
        matches!(self.outcome, PatchOutcome::Replaced | PatchOutcome::Inserted)
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self.outcome, PatchOutcome::Malformed(_))
    }

    pub fn into_text(self) -> String {
        self.text.into_owned()
    }
}

/// Set `key` to `value` in the header of `doc`.
///
/// An existing key is replaced in place, together with any indented lines
/// that belong to it. A missing key is appended right before the closing
/// delimiter. Every other byte of the document is preserved.
pub fn set<'a>(doc: &'a str, key: &str, value: &Value) -> Patch<'a> {
    if let Err(e) = check_keys(key, value) {
        return Patch::untouched(doc, PatchOutcome::Malformed(e));
    }
    let layout = match scan(doc) {
        Ok(layout) => layout,
        Err(e) => return Patch::untouched(doc, PatchOutcome::Malformed(e)),
    };

    let spans = field_spans(&layout);
    let (start, end, rendered, outcome) = match spans.iter().find(|s| s.key == key) {
        Some(span) => {
            let eol = if span.eol.is_empty() { layout.eol } else { span.eol };
            let rendered = render_field(key, value, eol);
            if doc[span.start..span.end] == rendered {
                return Patch::untouched(doc, PatchOutcome::Unchanged);
            }
            (span.start, span.end, rendered, PatchOutcome::Replaced)
        }
        None => {
            let at = layout.close_start;
            (at, at, render_field(key, value, layout.eol), PatchOutcome::Inserted)
        }
    };

    let mut out = String::with_capacity(doc.len() - (end - start) + rendered.len());
    out.push_str(&doc[..start]);
    out.push_str(&rendered);
    out.push_str(&doc[end..]);
    Patch {
        text: Cow::Owned(out),
        outcome,
    }
}

/// Apply several [`set`] calls in order.
///
/// Stops at the first malformed patch and returns the input untouched. The
/// outcome is `Inserted` if any key was inserted, else `Replaced` if any was
/// replaced, else `Unchanged`.
pub fn set_all<'a, 'k, I>(doc: &'a str, updates: I) -> Patch<'a>
where
    I: IntoIterator<Item = (&'k str, Value)>,
{
    let mut text: Cow<'a, str> = Cow::Borrowed(doc);
    let mut inserted = false;
    let mut replaced = false;

    for (key, value) in updates {
        let patch = set(&text, key, &value);
        match patch.outcome {
            PatchOutcome::Malformed(e) => {
                return Patch::untouched(doc, PatchOutcome::Malformed(e));
            }
            PatchOutcome::Unchanged => continue,
            PatchOutcome::Inserted => inserted = true,
            PatchOutcome::Replaced => replaced = true,
        }
        text = Cow::Owned(patch.text.into_owned());
    }

    let outcome = if inserted {
        PatchOutcome::Inserted
    } else if replaced {
        PatchOutcome::Replaced
    } else {
        PatchOutcome::Unchanged
    };
    Patch { text, outcome }
}

/// Render one header field, terminated by `eol`.
pub(crate) fn render_field(key: &str, value: &Value, eol: &str) -> String {
    match value {
        Value::Scalar(s) => format!("{key}: {}{eol}", s.render()),
        Value::List(items) if items.is_empty() => format!("{key}: []{eol}"),
        Value::List(items) => {
            let mut out = format!("{key}:{eol}");
            for item in items {
                if item.is_empty() {
                    out.push_str(&format!("  - {{}}{eol}"));
                    continue;
                }
                for (i, (k, v)) in item.iter().enumerate() {
                    let lead = if i == 0 { "  - " } else { "    " };
                    out.push_str(&format!("{lead}{k}: {}{eol}", v.render()));
                }
            }
            out
        }
    }
}

pub(crate) fn check_keys(key: &str, value: &Value) -> Result<(), CodecError> {
    if !is_valid_key(key) {
        return Err(CodecError::InvalidKey(key.to_string()));
    }
    if let Value::List(items) = value {
        for (k, _) in items.iter().flat_map(|r| r.iter()) {
            if !is_valid_key(k) {
                return Err(CodecError::InvalidKey(k.to_string()));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::header::{get, Header};
    use crate::value::{Record, Scalar};

    const DOC: &str = "---\nlayout: \"entry\"\nrank: 3\nchange_type: \"modified\"\n---\n\nSome body: with colon\n---\nnot a header\n";

    #[test]
    fn replace_existing_key_in_place() {
        let patch = set(DOC, "rank", &Value::from(7i64));
        assert_eq!(patch.outcome, PatchOutcome::Replaced);
        assert_eq!(
            patch.text,
            "---\nlayout: \"entry\"\nrank: 7\nchange_type: \"modified\"\n---\n\nSome body: with colon\n---\nnot a header\n"
        );
    }

    #[test]
    fn insert_missing_key_before_closing_delimiter() {
        let patch = set(DOC, "days_since_last_seen", &Value::null());
        assert_eq!(patch.outcome, PatchOutcome::Inserted);
        assert!(patch
            .text
            .starts_with("---\nlayout: \"entry\"\nrank: 3\nchange_type: \"modified\"\ndays_since_last_seen: null\n---\n"));
        assert!(patch.text.ends_with("\nSome body: with colon\n---\nnot a header\n"));
    }

    #[test]
    fn same_value_is_unchanged_and_borrowed() {
        let patch = set(DOC, "change_type", &Value::from("modified"));
        assert_eq!(patch.outcome, PatchOutcome::Unchanged);
        assert!(!patch.is_changed());
        assert!(matches!(patch.text, Cow::Borrowed(_)));
    }

    #[test]
    fn malformed_document_is_left_alone() {
        for doc in ["plain text", "---\nrank: 3\n", ""] {
            let patch = set(doc, "rank", &Value::from(1i64));
            assert!(patch.is_malformed());
            assert!(!patch.is_changed());
            assert_eq!(patch.text, doc);
        }
    }

    #[test]
    fn invalid_key_is_rejected() {
        let patch = set(DOC, "bad key", &Value::from(1i64));
        assert_eq!(
            patch.outcome,
            PatchOutcome::Malformed(CodecError::InvalidKey("bad key".into()))
        );
        let list = Value::List(vec![Record::new().with("no:colons", 1i64)]);
        assert!(set(DOC, "history", &list).is_malformed());
    }

    #[test]
    fn replace_scalar_with_list_and_back() {
        let list = Value::List(vec![
            Record::new().with("date", "2024-01-01").with("rank", 1i64),
            Record::new().with("date", "2024-01-02").with("rank", 2i64),
        ]);
        let with_list = set(DOC, "rank", &list).into_text();
        assert!(with_list.contains(
            "rank:\n  - date: \"2024-01-01\"\n    rank: 1\n  - date: \"2024-01-02\"\n    rank: 2\nchange_type:"
        ));
        assert_eq!(get(&with_list, "rank"), Some(list));

        let back = set(&with_list, "rank", &Value::from(3i64)).into_text();
        assert_eq!(back, DOC);
    }

    #[test]
    fn preserves_crlf_terminators() {
        let doc = "---\r\na: 1\r\n---\r\nbody\r\n";
        assert_eq!(set(doc, "a", &Value::from(2i64)).text, "---\r\na: 2\r\n---\r\nbody\r\n");
        assert_eq!(
            set(doc, "b", &Value::from(true)).text,
            "---\r\na: 1\r\nb: true\r\n---\r\nbody\r\n"
        );
    }

    #[test]
    fn only_first_duplicate_is_replaced() {
        let doc = "---\nk: 1\nk: 2\n---\n";
        assert_eq!(set(doc, "k", &Value::from(9i64)).text, "---\nk: 9\nk: 2\n---\n");
    }

    #[test]
    fn set_all_reports_aggregate_outcome() {
        let patch = set_all(
            DOC,
            [
                ("rank", Value::from(3i64)),
                ("change_type", Value::from("unchanged")),
                ("sentence_changed", Value::from(false)),
            ],
        );
        assert_eq!(patch.outcome, PatchOutcome::Inserted);
        let h = Header::parse(&patch.text).unwrap();
        assert_eq!(h.get("change_type").and_then(Value::as_str), Some("unchanged"));
        assert_eq!(h.get("sentence_changed").and_then(Value::as_bool), Some(false));

        let again = set_all(
            &patch.text,
            [
                ("rank", Value::from(3i64)),
                ("change_type", Value::from("unchanged")),
                ("sentence_changed", Value::from(false)),
            ],
        );
        assert_eq!(again.outcome, PatchOutcome::Unchanged);
    }

    #[test]
    fn set_all_on_malformed_returns_input() {
        let patch = set_all("oops", [("a", Value::from(1i64))]);
        assert!(patch.is_malformed());
        assert_eq!(patch.text, "oops");
    }

    fn key_strategy() -> impl Strategy<Value = String> {
        "[a-z_][a-z0-9_]{0,10}"
    }

    fn scalar_strategy() -> impl Strategy<Value = Scalar> {
        prop_oneof![
            Just(Scalar::Null),
            any::<bool>().prop_map(Scalar::Bool),
            any::<i64>().prop_map(Scalar::Int),
            (-1.0e12f64..1.0e12f64).prop_map(Scalar::Float),
            ".*".prop_map(Scalar::Str),
        ]
    }

    fn value_strategy() -> impl Strategy<Value = Value> {
        let record = proptest::collection::vec((key_strategy(), scalar_strategy()), 0..4)
            .prop_map(|fields| {
                fields
                    .into_iter()
                    .fold(Record::new(), |r, (k, v)| r.with(k, v))
            });
        prop_oneof![
            4 => scalar_strategy().prop_map(Value::Scalar),
            1 => proptest::collection::vec(record, 0..4).prop_map(Value::List),
        ]
    }

    fn doc_strategy() -> impl Strategy<Value = String> {
        (
            proptest::collection::btree_map(key_strategy(), value_strategy(), 0..6),
            ".*",
        )
            .prop_map(|(fields, body)| {
                let mut builder = crate::DocumentBuilder::new();
                for (k, v) in fields {
                    builder = builder.field(k, v);
                }
                builder.body(body).render().unwrap()
            })
    }

    proptest! {
        #[test]
        fn set_is_idempotent(doc in doc_strategy(), key in key_strategy(), value in value_strategy()) {
            let once = set(&doc, &key, &value).into_text();
            let twice = set(&once, &key, &value);
            prop_assert_eq!(&twice.outcome, &PatchOutcome::Unchanged);
            prop_assert_eq!(&*twice.text, once.as_str());
        }

        #[test]
        fn get_returns_what_was_set(doc in doc_strategy(), key in key_strategy(), value in value_strategy()) {
            let patched = set(&doc, &key, &value).into_text();
            prop_assert_eq!(get(&patched, &key), Some(value));
        }

        #[test]
        fn other_keys_and_body_are_preserved(doc in doc_strategy(), key in key_strategy(), value in value_strategy()) {
            let (before, body_before) = Header::split(&doc).unwrap();
            let patched = set(&doc, &key, &value).into_text();
            let (after, body_after) = Header::split(&patched).unwrap();
            prop_assert_eq!(body_before, body_after);
            for (k, v) in before.iter().filter(|(k, _)| *k != key) {
                prop_assert_eq!(after.get(k), Some(v));
            }
        }
    }
}
