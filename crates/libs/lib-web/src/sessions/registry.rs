//! # Session Registry
//!
//! Maps user ids to their conversation with the generative model.
//!
//! Lookup and creation happen under one write lock, so two first requests for
//! the same id racing each other still end up sharing one conversation.
//! `start_chat` does no I/O, which keeps that critical section short.
//!
//! The registry is bounded two ways ([`SessionPolicy`]):
//! - entries idle longer than `ttl` are dropped by [`SessionRegistry::sweep_expired`]
//!   (and replaced on lookup if the sweeper has not reached them yet);
//! - at `max_sessions`, the least recently used entry is evicted before inserting.

use chrono::{DateTime, Utc};
use lib_core::Config;
use lib_gemini::{ChatSession, GenerativeModel};
use lib_utils::{format_time, now_utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

/// Eviction limits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionPolicy {
    pub ttl: Duration,
    pub max_sessions: usize,
}

impl SessionPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            ttl: config.session_ttl,
            max_sessions: config.session_max,
        }
    }

    /// How often the sweeper should run: a quarter of the TTL, between 1 s and 5 min.
    pub fn sweep_every(&self) -> Duration {
        (self.ttl / 4).clamp(Duration::from_secs(1), Duration::from_secs(300))
    }
}

struct SessionEntry {
    handle: Arc<dyn ChatSession>,
    created_at: DateTime<Utc>,
    last_used: Instant,
}

/// Process-wide user id → conversation map.
pub struct SessionRegistry {
    model: Arc<dyn GenerativeModel>,
    policy: SessionPolicy,
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl SessionRegistry {
    pub fn new(model: Arc<dyn GenerativeModel>, policy: SessionPolicy) -> Self {
        Self {
            model,
            policy,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Return the conversation for `user_id`, starting one if needed.
    pub async fn get_or_create(&self, user_id: &str) -> Arc<dyn ChatSession> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        if let Some(entry) = sessions.get_mut(user_id) {
            if now.duration_since(entry.last_used) < self.policy.ttl {
                entry.last_used = now;
                return Arc::clone(&entry.handle);
            }
            debug!(user_id, created_at = %format_time(entry.created_at), "Session expired, starting a new one");
            sessions.remove(user_id);
        }

        if sessions.len() >= self.policy.max_sessions {
            evict_least_recent(&mut sessions);
        }

        let handle = self.model.start_chat();
        sessions.insert(
            user_id.to_string(),
            SessionEntry {
                handle: Arc::clone(&handle),
                created_at: now_utc(),
                last_used: now,
            },
        );
        info!(user_id, live_sessions = sessions.len(), "Started new chat session");
        handle
    }

    /// Drop every session idle longer than the TTL. Returns how many were dropped.
    pub async fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let ttl = self.policy.ttl;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_used) < ttl);
        before - sessions.len()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Sweep expired sessions on a fixed period until the process exits.
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            // The first tick completes immediately; nothing can be expired yet.
            interval.tick().await;

            loop {
                interval.tick().await;
                let evicted = self.sweep_expired().await;
                if evicted > 0 {
                    info!(evicted, "Expired idle chat sessions");
                }
            }
        })
    }
}

fn evict_least_recent(sessions: &mut HashMap<String, SessionEntry>) {
    let oldest = sessions
        .iter()
        .min_by_key(|(_, entry)| entry.last_used)
        .map(|(id, _)| id.clone());

    if let Some(id) = oldest {
        sessions.remove(&id);
        info!(user_id = %id, "Session limit reached, evicted least recently used session");
    }
}
