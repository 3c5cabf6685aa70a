//! # HTTP Request Handlers
//!
//! - **[`ask`]**: `GET /ask` - relay a query to the user's conversation
//! - **[`ping`]**: `GET /ping`, `GET /health` - liveness
//!
//! Handlers extract their dependencies from [`crate::AppState`] via `FromRef`
//! and return `Result<Json<T>, AppError>`; `AppError` renders itself as
//! `{"error": "..."}` with the matching status.

pub mod ask;
pub mod ping;

#[cfg(test)]
mod tests;
