//! # Relay Data Transfer Objects
//!
//! ## Endpoints Using These DTOs
//!
//! - `GET /ask?q=...&id=...` - [`AskQuery`] (query) -> [`AskResponse`] | [`ErrorResponse`]
//! - `GET /ping` - [`PingResponse`]
//! - `GET /health` - [`HealthResponse`]
//!
//! ## Wire Format
//!
//! All DTOs use **snake_case** field names in JSON (default serde behavior).
//!
//! ```text
//! GET /ask?q=Hello&id=u1
//!
//! {"response": "Hi! How can I help you today?"}
//! ```

use serde::{Deserialize, Serialize};

/// Query parameters of `GET /ask`.
///
/// Built from the raw key/value pairs rather than deserialized as a struct, so
/// a repeated key does not turn into a rejection. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AskQuery {
    /// The user's message
    pub q: Option<String>,
    /// Opaque caller-supplied user identifier
    pub id: Option<String>,
}

impl AskQuery {
    /// Collect `q` and `id` from decoded query pairs, keeping the first
    /// non-empty value of each.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "q" => &mut query.q,
                "id" => &mut query.id,
                _ => continue,
            };
            if slot.as_deref().unwrap_or_default().is_empty() {
                *slot = Some(value);
            }
        }
        query
    }

    /// Return `(query, user_id)` when both are present and non-empty.
    pub fn required(&self) -> Option<(&str, &str)> {
        let q = self.q.as_deref().filter(|s| !s.is_empty())?;
        let id = self.id.as_deref().filter(|s| !s.is_empty())?;
        Some((q, id))
    }
}

/// Successful `/ask` body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AskResponse {
    pub response: String,
}

/// Error body used by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

/// `/ping` body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PingResponse {
    pub status: String,
}

impl PingResponse {
    pub fn alive() -> Self {
        Self {
            status: "alive".to_string(),
        }
    }
}

/// Keep-alive counters as reported by `/health`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeepAliveReport {
    pub enabled: bool,
    pub attempts: u64,
    pub successes: u64,
    pub failures: u64,
    pub consecutive_failures: u64,
    /// Unix seconds of the last successful ping
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_success_at: Option<u64>,
}

/// `/health` body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub sessions: usize,
    pub keepalive: KeepAliveReport,
}
