//! Text generation client.
//!
//! [`TextGenerator`] is the seam between the planner and the generative-text
//! service. [`GeminiClient`] implements it against the Gemini
//! `generateContent` REST endpoint: one request per call, no retry, no
//! backoff, no timeout.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::{GenerationError, GenerationErrorKind};

/// Produces text for a prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Sends the prompt and returns the generated text.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

// ============================================================================
// Wire Types
// ============================================================================

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    /// Conversation turns; the planner always sends exactly one.
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// Wraps a single prompt.
    #[must_use]
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        }
    }
}

/// One turn of content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    /// Content parts.
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A content part. Only text parts are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    /// Text of the part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Response body of `generateContent`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    /// Generated candidates; the first one is used.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// One generated candidate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    /// Generated content.
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
    ///
    /// # Errors
    ///
    /// Returns a `MalformedResponse` error when there is no candidate or the
    /// first candidate carries no text.
    pub fn into_text(self) -> Result<String, GenerationError> {
        let candidate = self.candidates.into_iter().next().ok_or_else(|| {
            GenerationError::new(
                GenerationErrorKind::MalformedResponse,
                "response contained no candidates",
            )
        })?;

        let texts: Vec<String> = candidate
            .content
            .unwrap_or_default()
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        if texts.is_empty() {
            return Err(GenerationError::new(
                GenerationErrorKind::MalformedResponse,
                "first candidate contained no text",
            ));
        }

        Ok(texts.concat())
    }
}

// ============================================================================
// Gemini Client
// ============================================================================

/// Client for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    api_base_url: String,
    model: String,
    api_key_env: String,
}

impl GeminiClient {
    /// Creates a client from the planner configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            http: Client::new(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key_env: config.api_key_env.clone(),
        }
    }

    /// Full endpoint URL without the key.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base_url, self.model
        )
    }

    fn api_key(&self) -> Result<String, GenerationError> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                GenerationError::new(
                    GenerationErrorKind::MissingApiKey,
                    format!("environment variable {} is not set", self.api_key_env),
                )
            })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self.api_key()?;
        let endpoint = self.endpoint();

        debug!(endpoint = %endpoint, prompt_len = prompt.len(), "Sending generateContent request");

        let response = self
            .http
            .post(&endpoint)
            .query(&[("key", api_key.as_str())])
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await
            .map_err(|e| {
                // Strip the URL so the key never ends up in logs.
                GenerationError::new(GenerationErrorKind::Network, e.without_url().to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err(GenerationError::new(
                GenerationErrorKind::from_status(status.as_u16()),
                format!("HTTP {status}: {message}"),
            ));
        }

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            GenerationError::new(
                GenerationErrorKind::MalformedResponse,
                e.without_url().to_string(),
            )
        })?;

        let text = body.into_text()?;
        debug!(response_len = text.len(), "Received generated content");
        Ok(text)
    }
}
