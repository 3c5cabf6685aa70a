//! # Generative Model and Chat Sessions
//!
//! [`GenerativeModel::start_chat`] hands out a [`ChatSession`] with an empty
//! history. Each [`ChatSession::send_message`] sends the accumulated history plus
//! the new user turn and records the reply, so the conversation carries over
//! between calls.
//!
//! ```rust,no_run
//! use lib_core::Config;
//! use lib_gemini::{ChatSession, GeminiModel, GenerativeModel};
//!
//! # async fn example() -> Result<(), lib_gemini::GeminiError> {
//! let model = GeminiModel::from_config(&Config::default())?;
//! let chat = model.start_chat();
//! let reply = chat.send_message("Hello").await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

use crate::client::GeminiClient;
use crate::error::GeminiError;
use crate::types::{Content, GenerationConfig};
use async_trait::async_trait;
use lib_core::Config;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Factory for conversational sessions.
pub trait GenerativeModel: Send + Sync {
    /// Start a conversation with an empty history. Performs no network I/O.
    fn start_chat(&self) -> Arc<dyn ChatSession>;

    /// Model identifier, for logs and the health report.
    fn name(&self) -> &str;
}

/// A conversation whose history accumulates across calls.
#[async_trait]
pub trait ChatSession: Send + Sync {
    /// Send one user message and return the model's text reply.
    async fn send_message(&self, text: &str) -> Result<String, GeminiError>;

    /// Number of turns recorded so far (user and model).
    async fn history_len(&self) -> usize;
}

/// [`GenerativeModel`] backed by the Gemini REST API.
#[derive(Clone, Debug)]
pub struct GeminiModel {
    client: GeminiClient,
    model: String,
    generation_config: Arc<GenerationConfig>,
}

impl GeminiModel {
    pub fn new(client: GeminiClient, model: impl Into<String>, generation_config: GenerationConfig) -> Self {
        Self {
            client,
            model: model.into(),
            generation_config: Arc::new(generation_config),
        }
    }

    /// Build the client and model from application configuration.
    pub fn from_config(config: &Config) -> Result<Self, GeminiError> {
        let client = GeminiClient::new(
            config.gemini_api_base.clone(),
            config.gemini_api_key.clone(),
            config.gemini_timeout,
        )?;

        if !client.has_api_key() {
            warn!("GEMINI_API_KEY is not set; requests to the model will be rejected upstream");
        }

        Ok(Self::new(
            client,
            config.gemini_model.clone(),
            GenerationConfig::from(&config.generation),
        ))
    }
}

impl GenerativeModel for GeminiModel {
    fn start_chat(&self) -> Arc<dyn ChatSession> {
        Arc::new(GeminiChat {
            model: self.clone(),
            history: Mutex::new(Vec::new()),
        })
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// One Gemini conversation.
///
/// The history lock is held for the whole round trip, so concurrent messages on
/// the same session are applied one at a time and in arrival order.
pub struct GeminiChat {
    model: GeminiModel,
    history: Mutex<Vec<Content>>,
}

#[async_trait]
impl ChatSession for GeminiChat {
    async fn send_message(&self, text: &str) -> Result<String, GeminiError> {
        let mut history = self.history.lock().await;
        history.push(Content::user(text));

        let result = self
            .model
            .client
            .generate_content(&self.model.model, &history, &self.model.generation_config)
            .await;

        match result {
            Ok(reply) => {
                let text = reply.joined_text();
                // Normalize role so replayed history is always well-formed.
                history.push(Content::model(text.clone()));
                debug!(turns = history.len(), "Chat turn recorded");
                Ok(text)
            }
            Err(e) => {
                // A failed turn must not poison the next request.
                history.pop();
                Err(e)
            }
        }
    }

    async fn history_len(&self) -> usize {
        self.history.lock().await.len()
    }
}
