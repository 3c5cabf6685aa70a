//! # Centralized Error Handling
//!
//! This module defines the application-wide error type [`AppError`] used by the
//! relay's handlers and services. It follows the `thiserror` pattern.
//!
//! ## Error Categories
//!
//! 1. **Client Errors** (4xx)
//!    - [`InvalidInput`](AppError::InvalidInput) → 400 Bad Request
//!    - [`NotFound`](AppError::NotFound) → 404 Not Found
//!    - [`RateLimited`](AppError::RateLimited) → 429 Too Many Requests
//!
//! 2. **Server Errors** (5xx)
//!    - [`Api`](AppError::Api) → 500, remote generative service failed
//!    - [`Config`](AppError::Config) → 500
//!    - [`Internal`](AppError::Internal) → 500, anything unclassified
//!
//! ## Wire Format
//!
//! Every error renders as `{"error": "<message>"}`. The message for server errors is
//! fixed; the detail carried by the variant is logged, never returned.
//!
//! ```rust
//! use lib_core::error::AppError;
//! use axum::http::StatusCode;
//!
//! let err = AppError::RateLimited("quota exhausted for project".to_string());
//! assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
//! assert_eq!(err.user_message(), "Rate limit exceeded");
//! ```

use crate::dto::ErrorResponse;
use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use thiserror::Error;

/// Message returned when `q` or `id` is missing from `/ask`.
pub const MISSING_PARAMS_MESSAGE: &str = "Please provide both query and id parameters.";

/// Application-wide error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error during startup or environment loading.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid or missing request input. The message is shown to the caller.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Requested route or resource does not exist. The message is shown to the caller.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The remote generative service refused the call for quota reasons.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// The remote generative service returned an error or could not be reached.
    #[error("API error: {0}")]
    Api(String),

    /// Internal server error (unexpected failures).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Api(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the message returned to the caller.
    ///
    /// Remote and internal failures return fixed text so nothing about the
    /// upstream response leaks to clients.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::RateLimited(_) => "Rate limit exceeded".to_string(),
            AppError::Api(_) => "API error occurred".to_string(),
            AppError::Config(_) | AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// The error returned when a required `/ask` parameter is absent.
    pub fn missing_params() -> Self {
        AppError::InvalidInput(MISSING_PARAMS_MESSAGE.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match status {
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => {
                tracing::debug!("Client error: {}", self);
            }
            StatusCode::TOO_MANY_REQUESTS => {
                tracing::warn!("Upstream rate limit: {}", self);
            }
            _ => {
                tracing::error!("Server error: {}", self);
            }
        }

        let body = Json(ErrorResponse {
            error: self.user_message(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        (status, serde_json::from_slice(&bytes).expect("body should be JSON"))
    }

    #[tokio::test]
    async fn missing_params_renders_fixed_message() {
        let (status, body) = body_json(AppError::missing_params()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({ "error": MISSING_PARAMS_MESSAGE }));
    }

    #[tokio::test]
    async fn server_errors_hide_detail() {
        let (status, body) = body_json(AppError::Api("403 API key not valid".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "error": "API error occurred" }));

        let (status, body) = body_json(AppError::Internal("no candidates".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "error": "Internal server error" }));
    }

    #[tokio::test]
    async fn rate_limit_maps_to_429() {
        let (status, body) = body_json(AppError::RateLimited("RESOURCE_EXHAUSTED".into())).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body, serde_json::json!({ "error": "Rate limit exceeded" }));
    }
}
