//! # Core Library
//!
//! Configuration, error type and wire DTOs shared by the relay crates.

pub mod config;
pub mod error;
pub mod dto;

// Re-export commonly used types
pub use config::{Config, GenerationSettings};
pub use error::AppError;
