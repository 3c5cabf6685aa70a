//! # Gemini Errors
//!
//! Failures of a `send_message` call, classified the way the relay reports them:
//!
//! | Variant | Relay response |
//! |---|---|
//! | [`RateLimited`](GeminiError::RateLimited) | 429 `Rate limit exceeded` |
//! | [`Api`](GeminiError::Api), [`Transport`](GeminiError::Transport) | 500 `API error occurred` |
//! | [`Decode`](GeminiError::Decode), [`EmptyResponse`](GeminiError::EmptyResponse) | 500 `Internal server error` |

use lib_core::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeminiError {
    /// HTTP 429 or an error envelope with status `RESOURCE_EXHAUSTED`.
    #[error("rate limit exceeded: {0}")]
    RateLimited(String),

    /// Any other non-success status from the API.
    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The request never produced a response (DNS, TLS, timeout, reset).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success status whose body could not be parsed.
    #[error("could not decode response: {0}")]
    Decode(String),

    /// A parsed response without any candidate text, e.g. a blocked prompt.
    #[error("response contained no text: {0}")]
    EmptyResponse(String),
}

impl From<GeminiError> for AppError {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::RateLimited(msg) => AppError::RateLimited(msg),
            e @ (GeminiError::Api { .. } | GeminiError::Transport(_)) => AppError::Api(e.to_string()),
            e @ (GeminiError::Decode(_) | GeminiError::EmptyResponse(_)) => {
                AppError::Internal(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn maps_onto_relay_statuses() {
        let rate: AppError = GeminiError::RateLimited("quota".into()).into();
        assert_eq!(rate.status_code(), StatusCode::TOO_MANY_REQUESTS);

        let api: AppError = GeminiError::Api { status: 403, message: "bad key".into() }.into();
        assert!(matches!(api, AppError::Api(ref m) if m.contains("403")));
        assert_eq!(api.user_message(), "API error occurred");

        let empty: AppError = GeminiError::EmptyResponse("SAFETY".into()).into();
        assert_eq!(empty.user_message(), "Internal server error");
    }
}
