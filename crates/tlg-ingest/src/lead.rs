/// Collapse every run of whitespace to one space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First declarative sentence of a summary.
///
/// Candidates are the prefixes of the whitespace-collapsed text that end in
/// `.` followed by whitespace or the end of the text. The first one with at
/// least `min_chars` characters and an ASCII letter wins.
pub fn first_declarative(text: &str, min_chars: usize) -> Option<String> {
    let text = collapse_whitespace(text);
    let bytes = text.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b != b'.' {
            continue;
        }
        let at_boundary = bytes.get(i + 1).map_or(true, |next| *next == b' ');
        if !at_boundary {
            continue;
        }
        let sentence = text[..=i].trim();
        if sentence.chars().count() >= min_chars
            && sentence.chars().any(|c| c.is_ascii_alphabetic())
        {
            return Some(sentence.to_string());
        }
    }
    None
}
