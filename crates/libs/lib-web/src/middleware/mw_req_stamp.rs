//! # Request Stamping Middleware
//!
//! Gives every request an id, stored in request extensions as [`RequestStamp`]
//! and echoed in the `X-Request-ID` response header.
//!
//! An id supplied by an upstream proxy in `X-Request-ID` is kept so logs can be
//! correlated across hops; otherwise a UUID v4 is generated.

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest inbound id accepted verbatim.
const MAX_INBOUND_ID_LEN: usize = 128;

/// Request metadata for tracing.
#[derive(Clone, Debug)]
pub struct RequestStamp {
    pub id: String,
}

impl RequestStamp {
    fn for_request(req: &Request) -> Self {
        let inbound = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty() && id.len() <= MAX_INBOUND_ID_LEN);

        Self {
            id: inbound.map(str::to_string).unwrap_or_else(|| Uuid::new_v4().to_string()),
        }
    }
}

/// Request stamping middleware.
pub async fn stamp_req(mut req: Request, next: Next) -> Response {
    let stamp = RequestStamp::for_request(&req);
    req.extensions_mut().insert(stamp.clone());

    let mut res = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&stamp.id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    res
}
