use crate::error::CodecResult;
use crate::patch::{check_keys, render_field};
use crate::value::Value;
use crate::DELIMITER;

/// Renders a complete document: header fields in insertion order, then body.
///
/// ```
/// use tlg_codec::{DocumentBuilder, Header, Value};
///
/// let doc = DocumentBuilder::new()
///     .field("layout", "topic")
///     .field("times_seen_total", 3i64)
///     .render()
///     .unwrap();
/// assert_eq!(doc, "---\nlayout: \"topic\"\ntimes_seen_total: 3\n---\n");
/// let header = Header::parse(&doc).unwrap();
/// assert_eq!(header.get("times_seen_total").and_then(Value::as_i64), Some(3));
/// ```
#[derive(Clone, Debug, Default)]
pub struct DocumentBuilder {
    fields: Vec<(String, Value)>,
    body: String,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Add the field only when `value` is `Some`.
    pub fn field_opt(self, key: impl Into<String>, value: Option<Value>) -> Self {
        match value {
            Some(v) => self.field(key, v),
            None => self,
        }
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Render with `\n` line endings. Fails if any key is not a valid header
    /// key.
    pub fn render(&self) -> CodecResult<String> {
        let mut out = String::new();
        out.push_str(DELIMITER);
        out.push('\n');
        for (key, value) in &self.fields {
            check_keys(key, value)?;
            out.push_str(&render_field(key, value, "\n"));
        }
        out.push_str(DELIMITER);
        out.push('\n');
        out.push_str(&self.body);
        Ok(out)
    }
}
