//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use feelscope_core::ports::{
    ContentFeedService, DatabaseService, PolarityScorer, SentimentModelService,
};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub model_adapter: Arc<dyn SentimentModelService>,
    pub polarity_adapter: Arc<dyn PolarityScorer>,
    pub feed_adapter: Arc<dyn ContentFeedService>,
}
