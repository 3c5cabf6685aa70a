//! Test doubles for the generative model, plus a log sink.

use async_trait::async_trait;
use lib_gemini::{ChatSession, GeminiError, GenerativeModel};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What a [`FakeChat`] does with each message.
#[derive(Clone, Copy, Debug)]
pub enum Behavior {
    /// Reply with the message text.
    Echo,
    /// Reply with every message this session has seen, joined by `|`.
    History,
    /// Fail with a rate-limit error.
    RateLimited,
    /// Fail with a generic API error.
    ApiError,
    /// Fail with an unclassified error.
    Broken,
}

/// Model that counts `start_chat` calls and keeps a handle to every session.
pub struct CountingModel {
    behavior: Behavior,
    started: AtomicUsize,
    chats: Mutex<Vec<Arc<FakeChat>>>,
}

impl CountingModel {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            started: AtomicUsize::new(0),
            chats: Mutex::new(Vec::new()),
        }
    }

    pub fn echo() -> Self {
        Self::new(Behavior::Echo)
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Messages received by each session, in creation order.
    pub fn histories(&self) -> Vec<Vec<String>> {
        self.chats
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.seen.lock().unwrap().clone())
            .collect()
    }
}

impl GenerativeModel for CountingModel {
    fn start_chat(&self) -> Arc<dyn ChatSession> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let chat = Arc::new(FakeChat {
            behavior: self.behavior,
            seen: Mutex::new(Vec::new()),
        });
        self.chats.lock().unwrap().push(Arc::clone(&chat));
        chat
    }

    fn name(&self) -> &str {
        "fake-model"
    }
}

pub struct FakeChat {
    behavior: Behavior,
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl ChatSession for FakeChat {
    async fn send_message(&self, text: &str) -> Result<String, GeminiError> {
        let mut seen = self.seen.lock().unwrap();
        seen.push(text.to_string());
        match self.behavior {
            Behavior::Echo => Ok(text.to_string()),
            Behavior::History => Ok(seen.join("|")),
            Behavior::RateLimited => Err(GeminiError::RateLimited("quota exhausted".into())),
            Behavior::ApiError => Err(GeminiError::Api {
                status: 400,
                message: "API key not valid".into(),
            }),
            Behavior::Broken => Err(GeminiError::EmptyResponse("SAFETY".into())),
        }
    }

    async fn history_len(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

/// In-memory writer for a `tracing_subscriber::fmt` subscriber.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Install a DEBUG-level subscriber writing here for the current thread.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
