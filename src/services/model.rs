// SPDX-License-Identifier: MIT

//! Client for the external generative-language API.
//!
//! Handles:
//! - Sending a message with the full prior history as context
//! - Rate limit detection (429)
//! - Safety-filter rejections surfaced by the API
//!
//! The API is stateless per request; the conversation is replayed from
//! storage on every call, so "clearing" a chat never involves the API.

use async_trait::async_trait;
use serde::Deserialize;

use crate::conversation::{Role, Turn};

/// Failures from the external model call.
///
/// These are recoverable at the orchestrator boundary: the user sees a
/// retry prompt and no conversation state is written.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model API rate limit exceeded")]
    RateLimited,

    #[error("prompt rejected by the model's safety filter: {0}")]
    Blocked(String),

    #[error("model API returned no reply")]
    EmptyResponse,

    #[error("model API error: {0}")]
    Api(String),

    #[error("model API request failed: {0}")]
    Transport(String),
}

/// Seam to the external model, mockable in tests.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Send `message` with `history` as context and return the reply text.
    async fn generate(&self, history: &[Turn], message: &str) -> Result<String, ModelError>;
}

/// Client for the Gemini-style `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key,
            model,
        }
    }

    /// The wire format only knows `user` and `model` roles; the hidden
    /// persona turn rides along as a user turn, as the API expects.
    fn wire_role(role: Role) -> &'static str {
        match role {
            Role::System | Role::User => "user",
            Role::Model => "model",
        }
    }

    fn request_body(history: &[Turn], message: &str) -> serde_json::Value {
        let mut contents: Vec<serde_json::Value> = history
            .iter()
            .map(|turn| {
                serde_json::json!({
                    "role": Self::wire_role(turn.role),
                    "parts": [{ "text": turn.text }]
                })
            })
            .collect();
        contents.push(serde_json::json!({
            "role": "user",
            "parts": [{ "text": message }]
        }));

        // The companion persona needs lenient thresholds; refusals are
        // handled in the prompt itself.
        let safety_settings: Vec<serde_json::Value> = [
            "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            "HARM_CATEGORY_HATE_SPEECH",
            "HARM_CATEGORY_HARASSMENT",
            "HARM_CATEGORY_DANGEROUS_CONTENT",
        ]
        .iter()
        .map(|category| {
            serde_json::json!({ "category": category, "threshold": "BLOCK_NONE" })
        })
        .collect();

        serde_json::json!({
            "contents": contents,
            "safetySettings": safety_settings,
        })
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, history: &[Turn], message: &str) -> Result<String, ModelError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::request_body(history, message))
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Model API rate limit hit (429)");
                return Err(ModelError::RateLimited);
            }
            return Err(ModelError::Api(format!("HTTP {}: {}", status, body)));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Api(format!("malformed response: {}", e)))?;

        if let Some(feedback) = body.prompt_feedback {
            if let Some(reason) = feedback.block_reason {
                return Err(ModelError::Blocked(reason));
            }
        }

        body.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or(ModelError::EmptyResponse)
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}
