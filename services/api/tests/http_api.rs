// End-to-end tests for the REST surface.
//
// The real router and handlers run in-process via tower::ServiceExt::oneshot.
// Storage is an in-memory DatabaseService; the model server and content feed
// are canned stubs.

use api_lib::adapters::LexiconPolarityAdapter;
use api_lib::web::{api_router, state::AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use feelscope_core::domain::{ClassificationRecord, NewRecord};
use feelscope_core::ports::{
    ContentFeedService, DatabaseService, PortError, PortResult, PromptStyle,
    SentimentModelService,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Infrastructure
// ---------------------------------------------------------------------------

#[derive(Default)]
struct InMemoryDb {
    records: Mutex<Vec<ClassificationRecord>>,
}

#[async_trait]
impl DatabaseService for InMemoryDb {
    async fn insert_record(&self, record: NewRecord) -> PortResult<ClassificationRecord> {
        let stored = ClassificationRecord::from_new(record, Uuid::new_v4(), Utc::now());
        self.records.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn list_records(&self, source: Option<&str>) -> PortResult<Vec<ClassificationRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .rev()
            .filter(|r| source.map_or(true, |s| r.source == s))
            .cloned()
            .collect())
    }

    async fn delete_all_records(&self) -> PortResult<u64> {
        let mut records = self.records.lock().unwrap();
        let count = records.len() as u64;
        records.clear();
        Ok(count)
    }
}

/// Returns a canned body and remembers which prompt style was requested.
struct CannedModel {
    body: Result<String, String>,
    styles: Mutex<Vec<PromptStyle>>,
}

impl CannedModel {
    fn replying(body: &str) -> Self {
        Self {
            body: Ok(body.to_string()),
            styles: Mutex::new(Vec::new()),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            body: Err(message.to_string()),
            styles: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SentimentModelService for CannedModel {
    async fn generate(&self, _text: &str, style: PromptStyle) -> PortResult<String> {
        self.styles.lock().unwrap().push(style);
        self.body.clone().map_err(PortError::Upstream)
    }
}

struct CannedFeed {
    titles: Option<Vec<String>>,
}

#[async_trait]
impl ContentFeedService for CannedFeed {
    async fn hot_titles(&self, _community: &str, limit: usize) -> PortResult<Vec<String>> {
        match &self.titles {
            Some(titles) => Ok(titles.iter().take(limit).cloned().collect()),
            None => Err(PortError::Upstream("feed unavailable".to_string())),
        }
    }
}

const MODEL_STREAM: &str = concat!(
    r#"{"model":"mistral","response":"Sure! {\"sentiment\": \"Positive\", ","done":false}"#,
    "\n",
    r#"{"model":"mistral","response":"\"emotion\": [\"joy\", \"excitement\"], \"topic\": \"hardware\"} Thanks.","done":false}"#,
    "\n",
    r#"{"model":"mistral","response":"","done":true}"#,
);

struct TestApp {
    router: Router,
    db: Arc<InMemoryDb>,
    model: Arc<CannedModel>,
}

fn build_app(model: CannedModel, feed_titles: Option<Vec<&str>>) -> TestApp {
    let db = Arc::new(InMemoryDb::default());
    let model = Arc::new(model);
    let feed = CannedFeed {
        titles: feed_titles.map(|t| t.into_iter().map(str::to_string).collect()),
    };
    let state = Arc::new(AppState {
        db: db.clone(),
        model_adapter: model.clone(),
        polarity_adapter: Arc::new(LexiconPolarityAdapter::new()),
        feed_adapter: Arc::new(feed),
    });
    TestApp {
        router: api_router(state),
        db,
        model,
    }
}

fn default_app() -> TestApp {
    build_app(CannedModel::replying(MODEL_STREAM), Some(vec!["a", "b"]))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 10 * 1024 * 1024)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn send_json(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send(router, req).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ---------------------------------------------------------------------------
// Heuristic route
// ---------------------------------------------------------------------------

#[tokio::test]
async fn analyze_basic_applies_trigger_words() {
    let app = default_app();

    for (text, expected) in [
        ("I love my new keyboard", "positive"),
        ("I hate mornings", "negative"),
        ("meh", "neutral"),
    ] {
        let (status, body) = send_json(
            &app.router,
            json_request("POST", "/analyze-basic", json!({ "text": text })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sentiment"], expected, "text: {text}");
        assert_eq!(body["text"], text);
        assert_eq!(body["emotion"], "unsure");
        assert_eq!(body["topic"], "general");
        assert_eq!(body["source"], "basic");
        assert!(body["_id"].is_string());
        assert!(body["timestamp"].is_string());
    }

    assert_eq!(app.db.records.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn missing_text_is_a_bad_request() {
    let app = default_app();

    for uri in ["/analyze", "/analyze-basic", "/reddit-textblob", "/reddit-analyze", "/save-analysis"] {
        let (status, body) =
            send_json(&app.router, json_request("POST", uri, json!({ "text": "" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "No text provided");
    }

    let (status, body) = send_json(
        &app.router,
        Request::builder()
            .method("POST")
            .uri("/analyze")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid JSON body");

    assert!(app.db.records.lock().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Model routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn analyze_extracts_classification_from_streamed_reply() {
    let app = default_app();

    let (status, body) = send_json(
        &app.router,
        json_request("POST", "/analyze", json!({ "text": "New GPU arrived" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sentiment"], "Positive");
    assert_eq!(body["emotion"], json!(["joy", "excitement"]));
    assert_eq!(body["topic"], "hardware");
    assert_eq!(body["source"], "manual");
    assert_eq!(*app.model.styles.lock().unwrap(), vec![PromptStyle::Manual]);
}

#[tokio::test]
async fn reddit_analyze_uses_reddit_prompt_and_source() {
    let app = default_app();

    let (status, body) = send_json(
        &app.router,
        json_request("POST", "/reddit-analyze", json!({ "text": "Rust 2024 edition is out" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "reddit-ai");

    let (_, body) = send_json(
        &app.router,
        json_request("POST", "/reddit-analyze", json!({ "text": "again", "source": "r/rust" })),
    )
    .await;
    assert_eq!(body["source"], "r/rust");
    assert_eq!(
        *app.model.styles.lock().unwrap(),
        vec![PromptStyle::RedditPost, PromptStyle::RedditPost]
    );
}

#[tokio::test]
async fn missing_fields_in_model_reply_default_to_unknown() {
    let app = build_app(
        CannedModel::replying(r#"{"response":"{\"sentiment\":\"Neutral\",\"emotion\":\"calm\"}"}"#),
        None,
    );

    let (status, body) = send_json(
        &app.router,
        json_request("POST", "/analyze", json!({ "text": "It rained." })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sentiment"], "Neutral");
    assert_eq!(body["emotion"], "calm");
    assert_eq!(body["topic"], "unknown");
}

#[tokio::test]
async fn reply_without_object_fails_and_stores_nothing() {
    let app = build_app(
        CannedModel::replying(r#"{"response":"I'd rather not say."}"#),
        None,
    );

    let (status, body) = send_json(
        &app.router,
        json_request("POST", "/analyze", json!({ "text": "anything" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Invalid JSON from model");
    assert_eq!(body["details"], "no object found");
    assert!(app.db.records.lock().unwrap().is_empty());
}

#[tokio::test]
async fn reply_with_two_objects_is_malformed() {
    let app = build_app(
        CannedModel::replying(
            r#"{"response":"{\"sentiment\":\"Positive\"} or maybe {\"sentiment\":\"Neutral\"}"}"#,
        ),
        None,
    );

    let (status, body) = send_json(
        &app.router,
        json_request("POST", "/analyze", json!({ "text": "hmm" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["details"].as_str().unwrap().starts_with("malformed object"));
    assert!(app.db.records.lock().unwrap().is_empty());
}

#[tokio::test]
async fn model_server_failure_is_an_internal_error() {
    let app = build_app(CannedModel::failing("connection refused"), None);

    let (status, body) = send_json(
        &app.router,
        json_request("POST", "/analyze", json!({ "text": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["details"].as_str().unwrap().contains("connection refused"));
    assert!(app.db.records.lock().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Lexicon and pass-through routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reddit_textblob_thresholds_lexicon_polarity() {
    let app = default_app();

    let (status, body) = send_json(
        &app.router,
        json_request("POST", "/reddit-textblob", json!({ "text": "This update is great" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sentiment"], "positive");
    assert_eq!(body["topic"], "reddit");
    assert_eq!(body["emotion"], "unsure");
    assert_eq!(body["source"], "reddit");

    let (_, body) = send_json(
        &app.router,
        json_request("POST", "/reddit-textblob", json!({ "text": "Worst launch ever" })),
    )
    .await;
    assert_eq!(body["sentiment"], "negative");

    let (_, body) = send_json(
        &app.router,
        json_request("POST", "/reddit-textblob", json!({ "text": "Weekly discussion thread" })),
    )
    .await;
    assert_eq!(body["sentiment"], "neutral");
}

#[tokio::test]
async fn save_analysis_passes_fields_through() {
    let app = default_app();

    let (status, body) = send_json(
        &app.router,
        json_request(
            "POST",
            "/save-analysis",
            json!({
                "text": "Loving the sunshine",
                "sentiment": "Positive",
                "emotion": ["joy"],
                "topic": "weather"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sentiment"], "Positive");
    assert_eq!(body["emotion"], json!(["joy"]));
    assert_eq!(body["topic"], "weather");
    assert_eq!(body["source"], "gemini");

    let (_, body) = send_json(
        &app.router,
        json_request("POST", "/save-analysis", json!({ "text": "bare", "source": "manual" })),
    )
    .await;
    assert_eq!(body["sentiment"], "unknown");
    assert_eq!(body["emotion"], "unknown");
    assert_eq!(body["topic"], "unknown");
    assert_eq!(body["source"], "manual");
}

// ---------------------------------------------------------------------------
// History, export and charts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn history_is_newest_first_and_repeatable() {
    let app = default_app();
    for text in ["first love", "second", "third hate"] {
        send(&app.router, json_request("POST", "/analyze-basic", json!({ "text": text }))).await;
    }

    let (status, first) = send_json(&app.router, empty_request("GET", "/history")).await;
    assert_eq!(status, StatusCode::OK);
    let texts: Vec<&str> = first
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["third hate", "second", "first love"]);

    let (_, second) = send_json(&app.router, empty_request("GET", "/history")).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn clearing_history_empties_it() {
    let app = default_app();
    send(&app.router, json_request("POST", "/analyze-basic", json!({ "text": "hello" }))).await;

    let (status, body) = send_json(&app.router, empty_request("DELETE", "/history")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "History cleared" }));

    let (_, history) = send_json(&app.router, empty_request("GET", "/history")).await;
    assert_eq!(history, json!([]));
}

#[tokio::test]
async fn export_is_a_csv_attachment() {
    let app = default_app();
    send(&app.router, json_request("POST", "/analyze-basic", json!({ "text": "I love it, really" }))).await;

    let resp = app
        .router
        .clone()
        .oneshot(empty_request("GET", "/export"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert_eq!(
        resp.headers()[header::CONTENT_DISPOSITION],
        "attachment;filename=export.csv"
    );

    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    let mut lines = csv.split("\r\n");
    assert_eq!(lines.next(), Some("Text,Sentiment,Emotion,Topic,Timestamp,Source"));
    let row = lines.next().unwrap();
    assert!(row.starts_with("\"I love it, really\",positive,unsure,general,"), "{row}");
    assert!(row.ends_with(",basic"), "{row}");
}

#[tokio::test]
async fn chart_data_counts_labels_and_filters_by_source() {
    let app = default_app();
    send(&app.router, json_request("POST", "/analyze", json!({ "text": "one" }))).await;
    send(&app.router, json_request("POST", "/analyze", json!({ "text": "two" }))).await;
    send(&app.router, json_request("POST", "/analyze-basic", json!({ "text": "meh" }))).await;

    let (status, body) = send_json(&app.router, empty_request("GET", "/chart-data")).await;
    assert_eq!(status, StatusCode::OK);
    let sentiments = body["sentiments"].as_array().unwrap();
    assert!(sentiments.contains(&json!({ "name": "Positive", "count": 2 })));
    assert!(sentiments.contains(&json!({ "name": "neutral", "count": 1 })));
    let emotions = body["emotions"].as_array().unwrap();
    assert!(emotions.contains(&json!({ "name": "joy", "count": 2 })));
    assert!(emotions.contains(&json!({ "name": "excitement", "count": 2 })));
    assert!(emotions.contains(&json!({ "name": "unsure", "count": 1 })));

    let (_, body) = send_json(&app.router, empty_request("GET", "/chart-data?source=basic")).await;
    assert_eq!(body["sentiments"], json!([{ "name": "neutral", "count": 1 }]));
    assert_eq!(body["emotions"], json!([{ "name": "unsure", "count": 1 }]));
}

#[tokio::test]
async fn chart_buckets_follow_insertion_order() {
    let app = default_app();
    for text in ["I hate mornings", "I love my new keyboard", "meh", "I love rain"] {
        send(&app.router, json_request("POST", "/analyze-basic", json!({ "text": text }))).await;
    }

    let (_, body) = send_json(&app.router, empty_request("GET", "/chart-data")).await;
    assert_eq!(
        body["sentiments"],
        json!([
            { "name": "negative", "count": 1 },
            { "name": "positive", "count": 2 },
            { "name": "neutral", "count": 1 },
        ])
    );
}

// ---------------------------------------------------------------------------
// Content feed
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reddit_search_returns_titles() {
    let app = default_app();

    let (status, body) =
        send_json(&app.router, empty_request("GET", "/reddit-search?subreddit=rust")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "posts": ["a", "b"] }));
}

#[tokio::test]
async fn reddit_search_validates_subreddit() {
    let app = default_app();

    let (status, body) = send_json(&app.router, empty_request("GET", "/reddit-search")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Subreddit is required");

    let (status, _) =
        send_json(&app.router, empty_request("GET", "/reddit-search?subreddit=..%2Fadmin")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reddit_search_feed_failure_is_an_internal_error() {
    let app = build_app(CannedModel::replying(MODEL_STREAM), None);

    let (status, body) =
        send_json(&app.router, empty_request("GET", "/reddit-search?subreddit=rust")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch subreddit");
}
