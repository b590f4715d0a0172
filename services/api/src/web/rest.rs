//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use feelscope_core::{
    domain::{Classification, ClassificationRecord, Emotion, NewRecord},
    normalize::{classify_model_output, keyword_heuristic, polarity_classification},
    ports::{PortError, PortResult, PromptStyle},
    report::{self, ChartData, LabelCount},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};
use utoipa::{IntoParams, OpenApi, ToSchema};

/// Number of hot posts fetched per subreddit search.
const FEED_POST_LIMIT: usize = 10;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        analyze_handler,
        analyze_basic_handler,
        history_handler,
        clear_history_handler,
        export_handler,
        chart_data_handler,
        reddit_search_handler,
        reddit_textblob_handler,
        reddit_analyze_handler,
        save_analysis_handler,
    ),
    components(
        schemas(
            AnalyzeRequest,
            BasicAnalyzeRequest,
            SaveAnalysisRequest,
            RecordResponse,
            MessageResponse,
            ErrorResponse,
            ChartDataResponse,
            LabelCountResponse,
            PostsResponse,
        )
    ),
    tags(
        (name = "FeelScope API", description = "Sentiment, emotion and topic classification with stored history.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Request Structs
//=========================================================================================

/// Text to classify, with an optional provenance tag.
#[derive(Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    pub text: Option<String>,
    pub source: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct BasicAnalyzeRequest {
    pub text: Option<String>,
}

/// A classification produced elsewhere, stored as-is.
#[derive(Deserialize, ToSchema)]
pub struct SaveAnalysisRequest {
    pub text: Option<String>,
    pub sentiment: Option<String>,
    /// A single label or a list of labels.
    #[schema(value_type = Option<Object>)]
    pub emotion: Option<serde_json::Value>,
    pub topic: Option<String>,
    pub source: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ChartDataParams {
    /// Only count records with this source tag.
    pub source: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RedditSearchParams {
    /// Subreddit name, letters, digits and underscores only.
    pub subreddit: Option<String>,
}

//=========================================================================================
// API Response Structs
//=========================================================================================

/// A stored classification record.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecordResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    pub sentiment: String,
    /// A single label or a list of labels.
    #[schema(value_type = Object)]
    pub emotion: Emotion,
    pub topic: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
}

impl From<ClassificationRecord> for RecordResponse {
    fn from(record: ClassificationRecord) -> Self {
        Self {
            id: record.id.to_string(),
            text: record.text,
            sentiment: record.sentiment,
            emotion: record.emotion,
            topic: record.topic,
            timestamp: record.timestamp,
            source: record.source,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// The body of every failed request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct LabelCountResponse {
    pub name: String,
    pub count: usize,
}

impl From<LabelCount> for LabelCountResponse {
    fn from(count: LabelCount) -> Self {
        Self {
            name: count.name,
            count: count.count,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ChartDataResponse {
    pub sentiments: Vec<LabelCountResponse>,
    pub emotions: Vec<LabelCountResponse>,
}

impl From<ChartData> for ChartDataResponse {
    fn from(chart: ChartData) -> Self {
        Self {
            sentiments: chart.sentiments.into_iter().map(Into::into).collect(),
            emotions: chart.emotions.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PostsResponse {
    pub posts: Vec<String>,
}

//=========================================================================================
// Error Helpers
//=========================================================================================

pub type HandlerError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, error: &str, details: Option<String>) -> HandlerError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            details,
        }),
    )
}

/// Logs a failed port call and converts it to an HTTP error.
fn port_failure(context: &str, e: PortError) -> HandlerError {
    error!("{}: {:?}", context, e);
    match e {
        PortError::Classification(cause) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Invalid JSON from model",
            Some(cause.to_string()),
        ),
        other => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            context,
            Some(other.to_string()),
        ),
    }
}

fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, HandlerError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        error_response(
            StatusCode::BAD_REQUEST,
            "Invalid JSON body",
            Some(rejection.body_text()),
        )
    })
}

fn required_text(text: Option<String>) -> Result<String, HandlerError> {
    match text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(error_response(StatusCode::BAD_REQUEST, "No text provided", None)),
    }
}

fn source_or(source: Option<String>, default: &str) -> String {
    source
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn is_valid_subreddit(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

//=========================================================================================
// Shared Pipelines
//=========================================================================================

/// Asks the model for a classification and extracts it from the streamed reply.
async fn classify_with_model(
    app_state: &AppState,
    text: &str,
    style: PromptStyle,
) -> PortResult<Classification> {
    let raw = app_state.model_adapter.generate(text, style).await?;
    let classification = classify_model_output(&raw)?;
    debug!(?classification, "Model classification extracted");
    Ok(classification)
}

async fn store(
    app_state: &AppState,
    record: NewRecord,
) -> Result<Json<RecordResponse>, HandlerError> {
    let stored = app_state
        .db
        .insert_record(record)
        .await
        .map_err(|e| port_failure("Failed to store analysis", e))?;
    info!(id = %stored.id, source = %stored.source, sentiment = %stored.sentiment, "Analysis stored");
    Ok(Json(stored.into()))
}

async fn model_route(
    app_state: &AppState,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
    style: PromptStyle,
    default_source: &str,
) -> Result<Json<RecordResponse>, HandlerError> {
    let req = parse_body(payload)?;
    let text = required_text(req.text)?;
    let source = source_or(req.source, default_source);

    let classification = classify_with_model(app_state, &text, style)
        .await
        .map_err(|e| port_failure("Failed to classify text with the model", e))?;

    store(app_state, NewRecord::new(text, classification, source)).await
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Classify text with the local language model and store the result.
#[utoipa::path(
    post,
    path = "/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Analysis stored", body = RecordResponse),
        (status = 400, description = "No text provided", body = ErrorResponse),
        (status = 500, description = "Model or storage failure", body = ErrorResponse)
    )
)]
pub async fn analyze_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    model_route(&app_state, payload, PromptStyle::Manual, "manual").await
}

/// Classify text with the trigger-word heuristic and store the result.
#[utoipa::path(
    post,
    path = "/analyze-basic",
    request_body = BasicAnalyzeRequest,
    responses(
        (status = 200, description = "Analysis stored", body = RecordResponse),
        (status = 400, description = "No text provided", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn analyze_basic_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<BasicAnalyzeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let req = parse_body(payload)?;
    let text = required_text(req.text)?;
    let classification = keyword_heuristic(&text);
    store(&app_state, NewRecord::new(text, classification, "basic")).await
}

/// List every stored analysis, newest first.
#[utoipa::path(
    get,
    path = "/history",
    responses(
        (status = 200, description = "Stored analyses", body = Vec<RecordResponse>),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn history_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HandlerError> {
    let records = app_state
        .db
        .list_records(None)
        .await
        .map_err(|e| port_failure("Failed to load history", e))?;
    let body: Vec<RecordResponse> = records.into_iter().map(Into::into).collect();
    Ok(Json(body))
}

/// Delete every stored analysis.
#[utoipa::path(
    delete,
    path = "/history",
    responses(
        (status = 200, description = "History cleared", body = MessageResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn clear_history_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HandlerError> {
    let deleted = app_state
        .db
        .delete_all_records()
        .await
        .map_err(|e| port_failure("Failed to clear history", e))?;
    info!(deleted, "History cleared");
    Ok(Json(MessageResponse {
        message: "History cleared".to_string(),
    }))
}

/// Download every stored analysis as a CSV attachment.
#[utoipa::path(
    get,
    path = "/export",
    responses(
        (status = 200, description = "CSV export", body = String, content_type = "text/csv"),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn export_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HandlerError> {
    let records = app_state
        .db
        .list_records(None)
        .await
        .map_err(|e| port_failure("Failed to export history", e))?;
    let csv = report::to_csv(&records);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment;filename=export.csv"),
        ],
        csv,
    ))
}

/// Count sentiments and emotion labels, optionally for one source only.
#[utoipa::path(
    get,
    path = "/chart-data",
    params(ChartDataParams),
    responses(
        (status = 200, description = "Label counts", body = ChartDataResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn chart_data_handler(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<ChartDataParams>,
) -> Result<impl IntoResponse, HandlerError> {
    let source = params.source.filter(|s| !s.is_empty());
    let mut records = app_state
        .db
        .list_records(source.as_deref())
        .await
        .map_err(|e| port_failure("Failed to load chart data", e))?;
    // Buckets follow insertion order, so count oldest first.
    records.reverse();
    Ok(Json(ChartDataResponse::from(report::chart_data(&records))))
}

/// Fetch the titles of a subreddit's hot posts.
#[utoipa::path(
    get,
    path = "/reddit-search",
    params(RedditSearchParams),
    responses(
        (status = 200, description = "Post titles", body = PostsResponse),
        (status = 400, description = "Missing or invalid subreddit", body = ErrorResponse),
        (status = 500, description = "Feed failure", body = ErrorResponse)
    )
)]
pub async fn reddit_search_handler(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<RedditSearchParams>,
) -> Result<impl IntoResponse, HandlerError> {
    let subreddit = match params.subreddit.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "Subreddit is required",
                None,
            ))
        }
    };
    if !is_valid_subreddit(&subreddit) {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Invalid subreddit name",
            None,
        ));
    }

    let posts = app_state
        .feed_adapter
        .hot_titles(&subreddit, FEED_POST_LIMIT)
        .await
        .map_err(|e| port_failure("Failed to fetch subreddit", e))?;
    Ok(Json(PostsResponse { posts }))
}

/// Classify a post with the lexicon polarity scorer and store the result.
#[utoipa::path(
    post,
    path = "/reddit-textblob",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Analysis stored", body = RecordResponse),
        (status = 400, description = "No text provided", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn reddit_textblob_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let req = parse_body(payload)?;
    let text = required_text(req.text)?;
    let source = source_or(req.source, "reddit");

    let polarity = app_state.polarity_adapter.polarity(&text);
    debug!(polarity, "Lexicon polarity computed");
    store(&app_state, NewRecord::new(text, polarity_classification(polarity), source)).await
}

/// Classify a post with the local language model and store the result.
#[utoipa::path(
    post,
    path = "/reddit-analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Analysis stored", body = RecordResponse),
        (status = 400, description = "No text provided", body = ErrorResponse),
        (status = 500, description = "Model or storage failure", body = ErrorResponse)
    )
)]
pub async fn reddit_analyze_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    model_route(&app_state, payload, PromptStyle::RedditPost, "reddit-ai").await
}

/// Store a classification produced by an external classifier.
#[utoipa::path(
    post,
    path = "/save-analysis",
    request_body = SaveAnalysisRequest,
    responses(
        (status = 200, description = "Analysis stored", body = RecordResponse),
        (status = 400, description = "No text provided", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn save_analysis_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<SaveAnalysisRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let req = parse_body(payload)?;
    let text = required_text(req.text)?;
    let classification = Classification::from_supplied(
        req.sentiment,
        req.emotion.as_ref().and_then(Emotion::from_json),
        req.topic,
    );
    let source = source_or(req.source, "gemini");
    store(&app_state, NewRecord::new(text, classification, source)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subreddit_names_are_restricted() {
        assert!(is_valid_subreddit("rust"));
        assert!(is_valid_subreddit("Ask_Science2"));
        assert!(!is_valid_subreddit(""));
        assert!(!is_valid_subreddit("../admin"));
        assert!(!is_valid_subreddit("rust?limit=100"));
    }

    #[test]
    fn blank_text_is_rejected() {
        assert!(required_text(None).is_err());
        assert!(required_text(Some("   ".into())).is_err());
        assert_eq!(required_text(Some("hi".into())).unwrap(), "hi");
    }

    #[test]
    fn classification_failures_carry_details() {
        let (status, Json(body)) = port_failure(
            "Failed to classify text with the model",
            PortError::Classification(feelscope_core::ExtractionError::NoObjectFound),
        );
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Invalid JSON from model");
        assert_eq!(body.details.as_deref(), Some("no object found"));
    }
}
