//! crates/feelscope_core/src/normalize.rs
//!
//! Builds canonical `Classification`s from each kind of classifier output.
//! Missing or malformed labels become `"unknown"`; only a failure to find any
//! object in a model response is an error.

use crate::domain::{Classification, Emotion, UNKNOWN_LABEL};
use crate::extract::{extract_object, reassemble_stream, ExtractionError};
use serde_json::{Map, Value};

/// Polarity above this is positive, below its negation is negative.
pub const POLARITY_THRESHOLD: f64 = 0.1;

impl Classification {
    /// Reads `sentiment`, `emotion` and `topic` from an extracted object.
    pub fn from_extracted(object: &Map<String, Value>) -> Self {
        Self {
            sentiment: label_field(object, "sentiment"),
            emotion: object
                .get("emotion")
                .and_then(Emotion::from_json)
                .unwrap_or_default(),
            topic: label_field(object, "topic"),
        }
    }

    /// Passes through labels produced by an external classifier.
    pub fn from_supplied(
        sentiment: Option<String>,
        emotion: Option<Emotion>,
        topic: Option<String>,
    ) -> Self {
        Self {
            sentiment: sentiment.unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
            emotion: emotion.unwrap_or_default(),
            topic: topic.unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
        }
    }
}

/// Runs the full model-response core: reassemble, extract, normalize.
pub fn classify_model_output(raw: &str) -> Result<Classification, ExtractionError> {
    let text = reassemble_stream(raw);
    let object = extract_object(&text)?;
    Ok(Classification::from_extracted(&object))
}

/// Trigger-word classifier used by the offline route.
pub fn keyword_heuristic(text: &str) -> Classification {
    let lowered = text.to_lowercase();
    let sentiment = if lowered.contains("love") {
        "positive"
    } else if lowered.contains("hate") {
        "negative"
    } else {
        "neutral"
    };

    Classification {
        sentiment: sentiment.to_string(),
        emotion: Emotion::Label("unsure".to_string()),
        topic: "general".to_string(),
    }
}

/// Maps a lexicon polarity score in [-1, 1] to a classification.
pub fn polarity_classification(polarity: f64) -> Classification {
    let sentiment = if polarity > POLARITY_THRESHOLD {
        "positive"
    } else if polarity < -POLARITY_THRESHOLD {
        "negative"
    } else {
        "neutral"
    };

    Classification {
        sentiment: sentiment.to_string(),
        emotion: Emotion::Label("unsure".to_string()),
        topic: "reddit".to_string(),
    }
}

fn label_field(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        Some(Value::String(label)) => label.clone(),
        _ => UNKNOWN_LABEL.to_string(),
    }
}

impl Emotion {
    /// Reads a string or a list of strings; non-string list items are dropped.
    /// Any other JSON value is not an emotion.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(label) => Some(Emotion::Label(label.clone())),
            Value::Array(items) => Some(Emotion::Labels(
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect(),
            )),
            _ => None,
        }
    }
}
