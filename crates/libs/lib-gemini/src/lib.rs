//! # Gemini Library
//!
//! Client for the Google Generative Language API and the conversational session
//! abstraction the relay is built on.
//!
//! The relay only depends on the [`GenerativeModel`] and [`ChatSession`] traits;
//! [`GeminiModel`] is the production implementation and tests substitute their own.

pub mod client;
pub mod error;
pub mod model;
pub mod types;

pub use client::GeminiClient;
pub use error::GeminiError;
pub use model::{ChatSession, GeminiChat, GeminiModel, GenerativeModel};
