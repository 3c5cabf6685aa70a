//! # Ask Handler
//!
//! `GET /ask?q=<query>&id=<user_id>` relays `q` to the conversation of user `id`.
//!
//! ```bash
//! curl "http://localhost:8080/ask?q=Hello&id=u1"
//! # {"response":"Hi there! How can I help you today?"}
//!
//! curl "http://localhost:8080/ask?id=u1"
//! # 400 {"error":"Please provide both query and id parameters."}
//! ```

use crate::services::ChatService;
use crate::sessions::SessionRegistry;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use lib_core::dto::{AskQuery, AskResponse};
use lib_core::AppError;
use std::sync::Arc;
use tracing::debug;

/// Relay a query to the caller's conversation.
///
/// **Route**: `GET /ask`
///
/// # Returns
///
/// - 200 `{"response": "..."}`
/// - 400 when `q` or `id` is missing or empty; the registry is left untouched.
///   A repeated key uses its first non-empty value.
/// - 429 when the model is rate limited
/// - 500 on model API errors and anything unexpected
pub async fn ask(
    State(sessions): State<Arc<SessionRegistry>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<AskResponse>, AppError> {
    // A query string that cannot be decoded at all is reported like a missing one.
    let Query(pairs) = query.map_err(|rejection| {
        debug!(%rejection, "Rejected /ask query string");
        AppError::missing_params()
    })?;

    let params = AskQuery::from_pairs(pairs);
    let (q, user_id) = params.required().ok_or_else(AppError::missing_params)?;

    let response = ChatService::new(sessions).ask(user_id, q).await?;
    Ok(Json(AskResponse { response }))
}
