//! # Chat Service
//!
//! Relays one user message to that user's conversation.
//!
//! ```text
//! ask handler → ChatService → SessionRegistry → ChatSession (Gemini)
//! ```

use crate::sessions::SessionRegistry;
use lib_core::AppError;
use std::sync::Arc;
use tracing::{debug, instrument};

pub struct ChatService {
    sessions: Arc<SessionRegistry>,
}

impl ChatService {
    pub fn new(sessions: Arc<SessionRegistry>) -> Self {
        Self { sessions }
    }

    /// Send `query` on behalf of `user_id` and return the model's reply.
    ///
    /// # Errors
    ///
    /// - `AppError::RateLimited` when the model's quota is exhausted
    /// - `AppError::Api` when the model rejects the call or cannot be reached
    /// - `AppError::Internal` for replies that cannot be used
    ///
    /// Nothing is retried. Failures are logged once, when the `AppError` is
    /// rendered.
    #[instrument(skip(self, query), fields(query_len = query.len()))]
    pub async fn ask(&self, user_id: &str, query: &str) -> Result<String, AppError> {
        let session = self.sessions.get_or_create(user_id).await;

        let reply = session.send_message(query).await?;
        debug!(reply_len = reply.len(), "Model replied");
        Ok(reply)
    }
}
