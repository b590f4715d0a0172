//! crates/feelscope_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the database, the model server and the content feed.

use crate::domain::{ClassificationRecord, NewRecord};
use crate::extract::ExtractionError;
use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Upstream call failed: {0}")]
    Upstream(String),
    #[error("Classification failed: {0}")]
    Classification(#[from] ExtractionError),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    /// Stores a record, assigning its id and timestamp.
    async fn insert_record(&self, record: NewRecord) -> PortResult<ClassificationRecord>;

    /// Returns stored records newest first, optionally only those with `source`.
    async fn list_records(&self, source: Option<&str>) -> PortResult<Vec<ClassificationRecord>>;

    /// Removes every record and returns how many were deleted.
    async fn delete_all_records(&self) -> PortResult<u64>;
}

/// Which prompt wording the model server should receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStyle {
    /// Text typed in by the user.
    Manual,
    /// A post title taken from the content feed.
    RedditPost,
}

#[async_trait]
pub trait SentimentModelService: Send + Sync {
    /// Asks the model to classify `text` and returns the raw, possibly streamed, body.
    async fn generate(&self, text: &str, style: PromptStyle) -> PortResult<String>;
}

/// A local lexicon-based polarity scorer.
pub trait PolarityScorer: Send + Sync {
    /// Returns a polarity in [-1.0, 1.0]; 0.0 when nothing in the text scores.
    fn polarity(&self, text: &str) -> f64;
}

#[async_trait]
pub trait ContentFeedService: Send + Sync {
    /// Fetches up to `limit` titles from the community's hot listing.
    async fn hot_titles(&self, community: &str, limit: usize) -> PortResult<Vec<String>>;
}
