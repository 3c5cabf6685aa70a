//! # Services Layer
//!
//! Business logic between the HTTP handlers and the generative model:
//!
//! ```text
//! Handlers (HTTP) → Services → SessionRegistry / lib-gemini
//! ```
//!
//! Services return `Result<T, AppError>`; handlers render the error directly.

pub mod chat;

pub use chat::ChatService;
