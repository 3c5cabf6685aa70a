//! # Keep-Alive
//!
//! Periodic self-ping that stops hosting platforms from idling the process.
//!
//! The pinger runs on its own tokio task and never touches request handling.
//! Failures are retried on an exponential schedule ([`BackoffPolicy`]) and
//! counted in [`KeepAliveStats`], which `GET /health` reports.

pub mod pinger;
pub mod stats;

pub use pinger::{BackoffPolicy, KeepAlive, PingOutcome};
pub use stats::KeepAliveStats;
