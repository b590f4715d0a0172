//! crates/feelscope_core/src/extract.rs
//!
//! Pulls a JSON classification object out of a streamed model response.
//!
//! The model server streams one JSON fragment per line. Each fragment carries a
//! piece of the generated text in its `response` field. The generated text is
//! free-form: the model is asked for a bare JSON object but often wraps it in
//! prose, so the object is located by scanning for braces.

use serde_json::{Map, Value};

/// Marker some servers put in front of every streamed line.
const STREAM_MARKER: &str = "data: ";

/// Why no classification object could be taken from a model response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("no object found")]
    NoObjectFound,
    #[error("malformed object: {0}")]
    MalformedObject(String),
}

/// Concatenates the `response` field of every parseable streamed line, in order.
///
/// Lines that are not JSON objects, or whose `response` is missing or not a
/// string, are skipped.
pub fn reassemble_stream(raw: &str) -> String {
    raw.trim()
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let payload = line.strip_prefix(STREAM_MARKER).unwrap_or(line);
            match serde_json::from_str::<Value>(payload) {
                Ok(Value::Object(mut fragment)) => match fragment.remove("response") {
                    Some(Value::String(piece)) => Some(piece),
                    _ => None,
                },
                _ => None,
            }
        })
        .collect()
}

/// Parses the span from the first `{` to the last `}` of `text` as a JSON object.
///
/// The scan is greedy and does not track nesting: two objects in a row are
/// captured as a single span, which then fails to parse.
pub fn extract_object(text: &str) -> Result<Map<String, Value>, ExtractionError> {
    let span = object_span(text).ok_or(ExtractionError::NoObjectFound)?;
    match serde_json::from_str::<Value>(span) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(other) => Err(ExtractionError::MalformedObject(format!(
            "expected a JSON object, found {}",
            other
        ))),
        Err(e) => Err(ExtractionError::MalformedObject(e.to_string())),
    }
}

fn object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
