//! # Sessions
//!
//! Per-user conversation registry shared by all request handlers.

pub mod registry;

pub use registry::{SessionPolicy, SessionRegistry};
