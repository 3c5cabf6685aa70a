//! # Data Transfer Objects (DTOs)
//!
//! Request and response bodies of the relay's HTTP API.

pub mod relay;

pub use relay::*;
