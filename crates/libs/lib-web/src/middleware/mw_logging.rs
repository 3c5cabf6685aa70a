//! # Request/Response Logging Middleware
//!
//! One line per request and one per response, with the request id, method,
//! path, status and latency as structured fields.
//!
//! The `q` query parameter carries user-written text and is redacted; every
//! other parameter (such as `id`) is logged as sent.

use crate::middleware::mw_req_stamp::RequestStamp;
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{error, info, warn};

/// Query parameters whose values are never logged.
const REDACTED_PARAMS: &[&str] = &["q"];

/// Rewrite a raw query string with sensitive values replaced.
fn redact_query(query: &str) -> String {
    query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if REDACTED_PARAMS.contains(&key) => format!("{key}=***"),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Request/response logging middleware.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(redact_query);

    let request_id = req
        .extensions()
        .get::<RequestStamp>()
        .map(|s| s.id.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let client_ip = req
        .headers()
        .get("x-forwarded-for")
        .or_else(|| req.headers().get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        query = ?query,
        client_ip = ?client_ip,
        "[REQUEST] {} {}",
        method,
        path
    );

    let response = next.run(req).await;

    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis();

    if status.is_server_error() {
        error!(request_id = %request_id, status = status.as_u16(), duration_ms = elapsed_ms, "[RESPONSE] {} {} -> {} [SERVER ERROR]", method, path, status.as_u16());
    } else if status.is_client_error() {
        warn!(request_id = %request_id, status = status.as_u16(), duration_ms = elapsed_ms, "[RESPONSE] {} {} -> {} [CLIENT ERROR]", method, path, status.as_u16());
    } else {
        info!(request_id = %request_id, status = status.as_u16(), duration_ms = elapsed_ms, "[RESPONSE] {} {} -> {} ({}ms)", method, path, status.as_u16(), elapsed_ms);
    }

    response
}
