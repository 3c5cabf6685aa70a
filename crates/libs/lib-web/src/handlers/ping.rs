//! # Liveness Handlers
//!
//! - `GET /ping` - unconditional liveness, used as the keep-alive target
//! - `GET /health` - liveness plus session count and keep-alive counters
//!
//! Neither endpoint contacts the generative model.

use crate::keepalive::KeepAliveStats;
use crate::sessions::SessionRegistry;
use axum::extract::State;
use axum::Json;
use lib_core::dto::{HealthResponse, PingResponse};
use std::sync::Arc;

/// **Route**: `GET /ping`
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse::alive())
}

/// **Route**: `GET /health`
pub async fn health(
    State(sessions): State<Arc<SessionRegistry>>,
    State(keepalive): State<Arc<KeepAliveStats>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model: sessions.model_name().to_string(),
        sessions: sessions.len().await,
        keepalive: keepalive.report(),
    })
}
