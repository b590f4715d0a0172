pub mod rest;
pub mod state;

use crate::{config::Config, error::ApiError};
use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub use rest::{
    analyze_basic_handler, analyze_handler, chart_data_handler, clear_history_handler,
    export_handler, history_handler, reddit_analyze_handler, reddit_search_handler,
    reddit_textblob_handler, save_analysis_handler,
};
use state::AppState;

/// Builds the REST router over the shared state.
pub fn api_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/analyze", post(analyze_handler))
        .route("/analyze-basic", post(analyze_basic_handler))
        .route("/history", get(history_handler).delete(clear_history_handler))
        .route("/export", get(export_handler))
        .route("/chart-data", get(chart_data_handler))
        .route("/reddit-search", get(reddit_search_handler))
        .route("/reddit-textblob", post(reddit_textblob_handler))
        .route("/reddit-analyze", post(reddit_analyze_handler))
        .route("/save-analysis", post(save_analysis_handler))
        .with_state(app_state)
}

/// Any origin is allowed unless one is configured.
pub fn cors_layer(config: &Config) -> Result<CorsLayer, ApiError> {
    let Some(origin) = config.cors_allowed_origin.as_deref() else {
        return Ok(CorsLayer::permissive());
    };
    let origin = origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS origin '{}': {}", origin, e))
    })?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]))
}
