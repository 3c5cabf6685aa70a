//! # Web Library
//!
//! HTTP server for the relay: handlers, middleware, the per-user session
//! registry and the keep-alive pinger.

pub mod handlers;
pub mod keepalive;
pub mod middleware;
pub mod services;
pub mod sessions;
pub mod server;

#[cfg(test)]
pub(crate) mod test_support;

pub use server::{create_router, init_tracing, start_server, AppState, ServerConfig};
