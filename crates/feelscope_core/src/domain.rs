//! crates/feelscope_core/src/domain.rs
//!
//! Defines the core data structures for the application: the classification
//! produced by any of the classifiers and the record the store keeps for it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Placeholder used for every label the classifier did not supply.
pub const UNKNOWN_LABEL: &str = "unknown";

/// An emotion is either a single label or an ordered list of labels,
/// depending on what the classifier returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Emotion {
    Label(String),
    Labels(Vec<String>),
}

impl Emotion {
    pub fn unknown() -> Self {
        Emotion::Label(UNKNOWN_LABEL.to_string())
    }

    /// Every individual label, one per list element.
    pub fn labels(&self) -> Vec<&str> {
        match self {
            Emotion::Label(label) => vec![label.as_str()],
            Emotion::Labels(labels) => labels.iter().map(String::as_str).collect(),
        }
    }
}

impl Default for Emotion {
    fn default() -> Self {
        Emotion::unknown()
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Emotion::Label(label) => f.write_str(label),
            Emotion::Labels(labels) => f.write_str(&labels.join(", ")),
        }
    }
}

/// The labels a classifier assigned to a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub sentiment: String,
    pub emotion: Emotion,
    pub topic: String,
}

impl Default for Classification {
    fn default() -> Self {
        Self {
            sentiment: UNKNOWN_LABEL.to_string(),
            emotion: Emotion::unknown(),
            topic: UNKNOWN_LABEL.to_string(),
        }
    }
}

/// A classification that has not been stored yet.
/// The store assigns the id and timestamp.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub text: String,
    pub classification: Classification,
    pub source: String,
}

impl NewRecord {
    pub fn new(text: impl Into<String>, classification: Classification, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            classification,
            source: source.into(),
        }
    }
}

/// A stored classification. Records are immutable once written.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationRecord {
    pub id: Uuid,
    pub text: String,
    pub sentiment: String,
    pub emotion: Emotion,
    pub topic: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
}

impl ClassificationRecord {
    /// Completes a `NewRecord` with the identity and time assigned by the store.
    pub fn from_new(record: NewRecord, id: Uuid, timestamp: DateTime<Utc>) -> Self {
        let NewRecord {
            text,
            classification,
            source,
        } = record;
        Self {
            id,
            text,
            sentiment: classification.sentiment,
            emotion: classification.emotion,
            topic: classification.topic,
            timestamp,
            source,
        }
    }
}
