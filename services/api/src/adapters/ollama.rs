//! services/api/src/adapters/ollama.rs
//!
//! This module contains the adapter for a locally hosted Ollama model server.
//! It implements the `SentimentModelService` port from the `core` crate.

const MANUAL_PROMPT_TEMPLATE: &str = r#"
You are a sentiment, emotion, and topic classifier.
Classify this text:
"{text}"

Return only a valid JSON object like this, without comments or explanations:
{
  "sentiment": "Positive | Neutral | Negative",
  "emotion": ["..."],
  "topic": "..."
}
"#;

const REDDIT_PROMPT_TEMPLATE: &str = r#"
You are a sentiment, emotion, and topic classifier.
Analyze this Reddit post:
"{text}"

Return a valid JSON ONLY like this:
{
  "sentiment": "Positive | Neutral | Negative",
  "emotion": ["..."],
  "topic": "..."
}
"#;

use async_trait::async_trait;
use feelscope_core::ports::{PortError, PortResult, PromptStyle, SentimentModelService};
use serde::Serialize;
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `SentimentModelService` against Ollama's `/api/generate`.
#[derive(Clone)]
pub struct OllamaAdapter {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
}

impl OllamaAdapter {
    /// Creates a new `OllamaAdapter`.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    fn build_prompt(text: &str, style: PromptStyle) -> String {
        let template = match style {
            PromptStyle::Manual => MANUAL_PROMPT_TEMPLATE,
            PromptStyle::RedditPost => REDDIT_PROMPT_TEMPLATE,
        };
        template.replace("{text}", text)
    }
}

//=========================================================================================
// `SentimentModelService` Trait Implementation
//=========================================================================================

#[async_trait]
impl SentimentModelService for OllamaAdapter {
    /// Sends the classification prompt and reads the streamed body to completion.
    async fn generate(&self, text: &str, style: PromptStyle) -> PortResult<String> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: &self.model,
            prompt: Self::build_prompt(text, style),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| PortError::Upstream(format!("model server request failed: {}", e)))?;

        let body = response
            .text()
            .await
            .map_err(|e| PortError::Upstream(format!("model server body unreadable: {}", e)))?;

        debug!(bytes = body.len(), model = %self.model, "Model response received");
        Ok(body)
    }
}
