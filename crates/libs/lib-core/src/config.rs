//! # Application Configuration
//!
//! This module manages application configuration loaded from environment variables.
//! All configuration is validated on startup to fail fast if misconfigured.
//!
//! Every setting has a default, so an empty environment yields a working relay
//! listening on `0.0.0.0:8080`. The only secret, `GEMINI_API_KEY`, is deliberately
//! not required here: a missing key surfaces as a remote API error on the first
//! query.
//!
//! ```rust,no_run
//! use lib_core::Config;
//!
//! let config = Config::from_env().expect("invalid environment");
//! config.validate().expect("invalid configuration");
//! ```

use lib_utils::envs::{get_env_opt, get_env_or, get_env_parse_or};
use std::time::Duration;

/// Default Gemini model, matching the deployed relay.
pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";

/// Default REST root of the Generative Language API.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default listen address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default self-ping target.
///
/// Only useful for local runs: a loopback ping never reaches the hosting
/// platform's router, so deployments set `KEEPALIVE_URL` to the public URL.
pub const DEFAULT_KEEPALIVE_URL: &str = "http://127.0.0.1:8080/ping";

/// Sampling parameters sent with every generation request.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub response_mime_type: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 0.95,
            top_k: 64,
            max_output_tokens: 8192,
            response_mime_type: "text/plain".to_string(),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    /// Credential for the Generative Language API (`GEMINI_API_KEY`)
    pub gemini_api_key: Option<String>,

    /// Model name, e.g. `gemini-1.5-pro`
    pub gemini_model: String,

    /// API root without trailing slash
    pub gemini_api_base: String,

    /// Timeout applied to each outbound generation request
    pub gemini_timeout: Duration,

    /// Sampling parameters
    pub generation: GenerationSettings,

    /// Listen address (e.g., "0.0.0.0:8080")
    pub bind_address: String,

    /// Whether the keep-alive pinger runs
    pub keepalive_enabled: bool,

    /// URL the keep-alive pinger requests
    pub keepalive_url: String,

    /// Normal period between keep-alive pings
    pub keepalive_interval: Duration,

    /// Idle time after which a conversation is dropped
    pub session_ttl: Duration,

    /// Maximum number of live conversations
    pub session_max: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: DEFAULT_MODEL.to_string(),
            gemini_api_base: DEFAULT_API_BASE.to_string(),
            gemini_timeout: Duration::from_secs(120),
            generation: GenerationSettings::default(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            keepalive_enabled: true,
            keepalive_url: DEFAULT_KEEPALIVE_URL.to_string(),
            keepalive_interval: Duration::from_secs(300),
            session_ttl: Duration::from_secs(24 * 60 * 60),
            session_max: 10_000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let gemini_timeout_secs =
            get_env_parse_or("GEMINI_TIMEOUT_SECS", defaults.gemini_timeout.as_secs())
                .map_err(|e| format!("GEMINI_TIMEOUT_SECS must be a number of seconds: {}", e))?;

        let keepalive_enabled = get_env_parse_or("KEEPALIVE_ENABLED", defaults.keepalive_enabled)
            .map_err(|e| format!("KEEPALIVE_ENABLED must be true or false: {}", e))?;

        let keepalive_interval_secs =
            get_env_parse_or("KEEPALIVE_INTERVAL_SECS", defaults.keepalive_interval.as_secs())
                .map_err(|e| format!("KEEPALIVE_INTERVAL_SECS must be a number of seconds: {}", e))?;

        let session_ttl_secs = get_env_parse_or("SESSION_TTL_SECS", defaults.session_ttl.as_secs())
            .map_err(|e| format!("SESSION_TTL_SECS must be a number of seconds: {}", e))?;

        let session_max = get_env_parse_or("SESSION_MAX", defaults.session_max)
            .map_err(|e| format!("SESSION_MAX must be a positive integer: {}", e))?;

        Ok(Self {
            gemini_api_key: get_env_opt("GEMINI_API_KEY"),
            gemini_model: get_env_or("GEMINI_MODEL", DEFAULT_MODEL),
            gemini_api_base: get_env_or("GEMINI_API_BASE", DEFAULT_API_BASE)
                .trim_end_matches('/')
                .to_string(),
            gemini_timeout: Duration::from_secs(gemini_timeout_secs),
            generation: defaults.generation,
            bind_address: get_env_or("BIND_ADDRESS", DEFAULT_BIND_ADDRESS),
            keepalive_enabled,
            keepalive_url: get_env_or("KEEPALIVE_URL", DEFAULT_KEEPALIVE_URL),
            keepalive_interval: Duration::from_secs(keepalive_interval_secs),
            session_ttl: Duration::from_secs(session_ttl_secs),
            session_max,
        })
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.gemini_model.trim().is_empty() {
            return Err("GEMINI_MODEL must not be empty".to_string());
        }

        if self.gemini_timeout.is_zero() {
            return Err("GEMINI_TIMEOUT_SECS must be greater than 0".to_string());
        }

        if self.keepalive_interval.is_zero() {
            return Err("KEEPALIVE_INTERVAL_SECS must be greater than 0".to_string());
        }

        if self.session_ttl.is_zero() {
            return Err("SESSION_TTL_SECS must be greater than 0".to_string());
        }

        if self.session_max == 0 {
            return Err("SESSION_MAX must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployed_relay() {
        let config = Config::default();
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.gemini_model, "gemini-1.5-pro");
        assert_eq!(config.keepalive_interval, Duration::from_secs(300));
        assert_eq!(config.generation.top_k, 64);
        assert_eq!(config.generation.max_output_tokens, 8192);
        assert!(config.gemini_api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_capacity() {
        let config = Config {
            session_max: 0,
            ..Config::default()
        };
        assert!(config.validate().unwrap_err().contains("SESSION_MAX"));
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let config = Config {
            keepalive_interval: Duration::ZERO,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
