//! # Gemini HTTP Client
//!
//! Thin wrapper around `reqwest` for the `generateContent` endpoint. The client
//! is stateless; conversation history is owned by [`crate::GeminiChat`].

use crate::error::GeminiError;
use crate::types::{
    ApiErrorEnvelope, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP client for the Generative Language API.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    api_base: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "***REDACTED***"))
            .finish()
    }
}

impl GeminiClient {
    /// Create a new client with timeout configuration.
    ///
    /// `api_key` may be `None`; requests are then sent unauthenticated and fail
    /// upstream.
    pub fn new(
        api_base: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GeminiError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.api_base, model)
    }

    /// Run one generation over `contents` and return the first candidate.
    pub async fn generate_content(
        &self,
        model: &str,
        contents: &[Content],
        generation_config: &GenerationConfig,
    ) -> Result<Content, GeminiError> {
        let body = GenerateContentRequest {
            contents,
            generation_config,
        };

        let mut req = self.http.post(self.endpoint(model)).json(&body);
        if let Some(key) = &self.api_key {
            req = req.header(API_KEY_HEADER, key);
        }

        debug!(model, turns = contents.len(), "Calling generateContent");
        let res = req.send().await?;
        let status = res.status();
        let text = res.text().await?;

        if !status.is_success() {
            return Err(classify_failure(status, &text));
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| GeminiError::Decode(e.to_string()))?;

        if let Some(content) = parsed.first_content() {
            return Ok(content.clone());
        }

        let reason = parsed
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .or_else(|| parsed.candidates.first().and_then(|c| c.finish_reason.clone()))
            .unwrap_or_else(|| "no candidates".to_string());
        Err(GeminiError::EmptyResponse(reason))
    }
}

/// Turn a non-success response into a [`GeminiError`].
pub(crate) fn classify_failure(status: StatusCode, body: &str) -> GeminiError {
    let envelope = serde_json::from_str::<ApiErrorEnvelope>(body).ok();

    let exhausted = envelope
        .as_ref()
        .and_then(|e| e.error.status.as_deref())
        .is_some_and(|s| s == "RESOURCE_EXHAUSTED");

    let message = envelope
        .map(|e| e.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.chars().take(200).collect());

    if status == StatusCode::TOO_MANY_REQUESTS || exhausted {
        GeminiError::RateLimited(message)
    } else {
        GeminiError::Api {
            status: status.as_u16(),
            message,
        }
    }
}
