//! Byte-level scan of a header block, shared by parsing and patching.

use crate::error::{CodecError, CodecResult};
use crate::value::{Record, Scalar, Value};
use crate::DELIMITER;

/// One physical line of a document.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Line<'a> {
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the line terminator.
    pub end: usize,
    /// Line content without its terminator.
    pub text: &'a str,
    /// `"\n"`, `"\r\n"`, or `""` for a final unterminated line.
    pub eol: &'a str,
}

/// Positions of a well-formed header block.
#[derive(Debug)]
pub(crate) struct Layout<'a> {
    /// Lines strictly between the two delimiters.
    pub lines: Vec<Line<'a>>,
    /// Byte offset of the closing delimiter line.
    pub close_start: usize,
    /// Byte offset just past the closing delimiter line.
    pub body_start: usize,
    /// Terminator used by the opening delimiter; new lines follow it.
    pub eol: &'a str,
}

/// A top-level `key: value` line plus the indented lines that belong to it.
#[derive(Debug)]
pub(crate) struct FieldSpan<'a> {
    pub key: &'a str,
    pub raw: &'a str,
    pub start: usize,
    pub end: usize,
    pub eol: &'a str,
    pub continuation: Vec<Line<'a>>,
}

impl FieldSpan<'_> {
    pub fn value(&self) -> Value {
        if self.raw == "[]" {
            return Value::List(Vec::new());
        }
        if self.raw.is_empty() && !self.continuation.is_empty() {
            return Value::List(parse_records(&self.continuation));
        }
        Value::Scalar(Scalar::parse(self.raw))
    }
}

pub(crate) fn lines(doc: &str) -> impl Iterator<Item = Line<'_>> {
    let mut offset = 0;
    doc.split_inclusive('\n').map(move |raw| {
        let start = offset;
        offset += raw.len();
        let (text, eol) = if let Some(text) = raw.strip_suffix("\r\n") {
            (text, "\r\n")
        } else if let Some(text) = raw.strip_suffix('\n') {
            (text, "\n")
        } else {
            (raw, "")
        };
        Line {
            start,
            end: offset,
            text,
            eol,
        }
    })
}

pub(crate) fn scan(doc: &str) -> CodecResult<Layout<'_>> {
    let mut iter = lines(doc);
    let open = iter.next().ok_or(CodecError::MissingOpenDelimiter)?;
    if open.text.trim_end() != DELIMITER {
        return Err(CodecError::MissingOpenDelimiter);
    }
    let eol = if open.eol.is_empty() { "\n" } else { open.eol };

    let mut header = Vec::new();
    for line in iter {
        if line.text.trim() == DELIMITER {
            return Ok(Layout {
                lines: header,
                close_start: line.start,
                body_start: line.end,
                eol,
            });
        }
        header.push(line);
    }
    Err(CodecError::UnclosedHeader)
}

enum LineKind<'a> {
    Key { key: &'a str, raw: &'a str },
    Continuation,
    Other,
}

fn classify(text: &str) -> LineKind<'_> {
    if text.trim().is_empty() {
        return LineKind::Other;
    }
    if text.starts_with([' ', '\t']) || text == "-" || text.starts_with("- ") {
        return LineKind::Continuation;
    }
    match split_key(text) {
        Some((key, raw)) => LineKind::Key { key, raw },
        None => LineKind::Other,
    }
}

/// Split `key: rest` at the first colon. The colon must be followed by
/// whitespace or end the line.
fn split_key(text: &str) -> Option<(&str, &str)> {
    let (key, rest) = text.split_once(':')?;
    if !is_valid_key(key) {
        return None;
    }
    if !(rest.is_empty() || rest.starts_with([' ', '\t'])) {
        return None;
    }
    Some((key, rest.trim()))
}

pub(crate) fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with(['-', '#', '"', '\''])
        && !key.chars().any(|c| c.is_whitespace() || c == ':')
}

pub(crate) fn field_spans<'a>(layout: &Layout<'a>) -> Vec<FieldSpan<'a>> {
    let mut spans: Vec<FieldSpan<'a>> = Vec::new();
    let mut open: Option<FieldSpan<'a>> = None;

    for line in &layout.lines {
        match classify(line.text) {
            LineKind::Key { key, raw } => {
                spans.extend(open.take());
                open = Some(FieldSpan {
                    key,
                    raw,
                    start: line.start,
                    end: line.end,
                    eol: line.eol,
                    continuation: Vec::new(),
                });
            }
            LineKind::Continuation => {
                if let Some(span) = open.as_mut() {
                    span.end = line.end;
                    span.continuation.push(*line);
                }
            }
            LineKind::Other => spans.extend(open.take()),
        }
    }
    spans.extend(open);
    spans
}

fn parse_records(lines: &[Line<'_>]) -> Vec<Record> {
    let mut records: Vec<Record> = Vec::new();
    for line in lines {
        let text = line.text.trim_start();
        let field = match text.strip_prefix('-') {
            Some(rest) if rest.is_empty() || rest.starts_with([' ', '\t']) => {
                records.push(Record::new());
                rest.trim()
            }
            _ => text,
        };
        if field.is_empty() || field == "{}" {
            continue;
        }
        if let (Some(record), Some((key, raw))) = (records.last_mut(), split_key(field)) {
            record.insert(key, Scalar::parse(raw));
        }
    }
    records
}
