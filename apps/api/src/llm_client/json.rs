//! Locating JSON inside free-form model replies.
//!
//! The prompts ask for "a valid JSON object/array" but models routinely wrap
//! it in prose or code fences. Extraction is greedy: the span runs from the
//! first opening delimiter to the last closing one, and strict parsing is
//! left to serde.

/// Returns the span from the first `{` to the last `}`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    greedy_span(text, '{', '}')
}

/// Returns the span from the first `[` to the last `]`.
pub fn extract_json_array(text: &str) -> Option<&str> {
    greedy_span(text, '[', ']')
}

fn greedy_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}
