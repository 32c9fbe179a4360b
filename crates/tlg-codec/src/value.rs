use std::fmt;

/// A single typed header value.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    /// Decode the raw text to the right of `key:`.
    ///
    /// Quoted text is always a string. Bare `true`/`false`, `null` (or `~`,
    /// or nothing at all) and numeric literals are typed; any other bare text
    /// is read as a string.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw {
            "" | "null" | "~" => return Self::Null,
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }
        if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
            return Self::Str(unescape(&raw[1..raw.len() - 1]));
        }
        if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
            return Self::Str(raw[1..raw.len() - 1].replace("''", "'"));
        }
        if is_int_literal(raw) {
            if let Ok(i) = raw.parse::<i64>() {
                return Self::Int(i);
            }
        }
        if is_float_literal(raw) {
            if let Ok(f) = raw.parse::<f64>() {
                return Self::Float(f);
            }
        }
        Self::Str(raw.to_string())
    }

    /// Encode for the right of `key: `.
    pub fn render(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            // Debug keeps a fractional part or exponent, so the literal is
            // read back as a float rather than an int.
            Self::Float(f) if f.is_finite() => format!("{f:?}"),
            Self::Float(_) => "null".to_string(),
            Self::Str(s) => quote(s),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view. Quoted digits and integral floats are accepted, since
    /// older documents were not consistent about quoting numbers.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Some(*f as i64),
            Self::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Str(s) if s == "true" => Some(true),
            Self::Str(s) if s == "false" => Some(false),
            _ => None,
        }
    }

    /// Textual view of any non-null scalar.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Str(s) => Some(s.clone()),
            other => Some(other.render()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u32> for Scalar {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Scalar {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Null)
    }
}

/// One item of a list value: an ordered set of scalar fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Scalar)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Record::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a field, replacing an existing field of the same key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Scalar>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A header value: a scalar, or a list of records rendered as an indented
/// block under the key.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    List(Vec<Record>),
}

impl Value {
    pub fn null() -> Self {
        Self::Scalar(Scalar::Null)
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Record]> {
        match self {
            Self::List(items) => Some(items),
            Self::Scalar(_) => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Scalar(Scalar::Null))
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_scalar().and_then(Scalar::as_i64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_scalar().and_then(Scalar::as_bool)
    }

    pub fn to_text(&self) -> Option<String> {
        self.as_scalar().and_then(Scalar::to_text)
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Self::Scalar(s)
    }
}

macro_rules! value_from_scalar {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Self::Scalar(v.into())
                }
            }
        )*
    };
}

value_from_scalar!(bool, i64, u32, f64, &str, String, Option<i64>, Option<&str>, Option<String>);

impl From<Vec<Record>> for Value {
    fn from(items: Vec<Record>) -> Self {
        Self::List(items)
    }
}

/// Quote a string, escaping backslashes, double quotes and line breaks so the
/// result always fits on one header line.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// Inverse of [`quote`] for the text between the quotes. Unknown escapes are
/// kept verbatim.
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn is_int_literal(s: &str) -> bool {
    let digits = s.strip_prefix(|c: char| c == '-' || c == '+').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_float_literal(s: &str) -> bool {
    s.bytes().any(|b| b.is_ascii_digit())
        && s.bytes().any(|b| matches!(b, b'.' | b'e' | b'E'))
        && s
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'-' | b'+'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_typed_literals() {
        assert_eq!(Scalar::parse("null"), Scalar::Null);
        assert_eq!(Scalar::parse(""), Scalar::Null);
        assert_eq!(Scalar::parse("~"), Scalar::Null);
        assert_eq!(Scalar::parse("true"), Scalar::Bool(true));
        assert_eq!(Scalar::parse("false"), Scalar::Bool(false));
        assert_eq!(Scalar::parse("42"), Scalar::Int(42));
        assert_eq!(Scalar::parse("-7"), Scalar::Int(-7));
        assert_eq!(Scalar::parse("0.25"), Scalar::Float(0.25));
        assert_eq!(Scalar::parse("1e-7"), Scalar::Float(1e-7));
    }

    #[test]
    fn parse_strings() {
        assert_eq!(Scalar::parse("\"hello\""), Scalar::Str("hello".into()));
        assert_eq!(Scalar::parse("\"null\""), Scalar::Str("null".into()));
        assert_eq!(Scalar::parse("\"42\""), Scalar::Str("42".into()));
        assert_eq!(Scalar::parse("'it''s'"), Scalar::Str("it's".into()));
        assert_eq!(Scalar::parse("2024-01-10"), Scalar::Str("2024-01-10".into()));
        assert_eq!(Scalar::parse("inf"), Scalar::Str("inf".into()));
        assert_eq!(Scalar::parse("\""), Scalar::Str("\"".into()));
    }

    #[test]
    fn huge_integer_stays_text() {
        assert_eq!(
            Scalar::parse("99999999999999999999"),
            Scalar::Str("99999999999999999999".into())
        );
    }

    #[test]
    fn render_typed_literals() {
        assert_eq!(Scalar::Null.render(), "null");
        assert_eq!(Scalar::Bool(false).render(), "false");
        assert_eq!(Scalar::Int(12).render(), "12");
        assert_eq!(Scalar::Float(1.0).render(), "1.0");
        assert_eq!(Scalar::Float(f64::NAN).render(), "null");
        assert_eq!(Scalar::Str("a \"b\" \\c".into()).render(), r#""a \"b\" \\c""#);
    }

    #[test]
    fn quote_unescape_roundtrip() {
        for s in ["", "plain", "tab\there", "line\nbreak", "\\n literal", "quote\"", "\r\n"] {
            let q = quote(s);
            assert!(!q.contains('\n'));
            assert_eq!(unescape(&q[1..q.len() - 1]), s);
        }
    }

    #[test]
    fn unescape_keeps_unknown_escapes() {
        assert_eq!(unescape(r"a\qb"), r"a\qb");
        assert_eq!(unescape("trailing\\"), "trailing\\");
    }

    #[test]
    fn lenient_integer_view() {
        assert_eq!(Scalar::Str("17".into()).as_i64(), Some(17));
        assert_eq!(Scalar::Float(3.0).as_i64(), Some(3));
        assert_eq!(Scalar::Float(3.5).as_i64(), None);
        assert_eq!(Scalar::Null.as_i64(), None);
    }

    #[test]
    fn record_insert_replaces_in_place() {
        let mut r = Record::new().with("a", 1i64).with("b", "x");
        r.insert("a", 2i64);
        let keys: Vec<&str> = r.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(r.get("a"), Some(&Scalar::Int(2)));
    }

    #[test]
    fn option_maps_to_null() {
        assert_eq!(Scalar::from(None::<i64>), Scalar::Null);
        assert_eq!(Value::from(Some("x")), Value::Scalar(Scalar::Str("x".into())));
    }
}
