//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// TTL in seconds for cached GET responses
    pub response_cache_ttl: u64,
    /// Fixed-window length in seconds for the contact rate limiter
    pub rate_limit_window: u64,
    /// Maximum submissions per counter per window
    pub rate_limit_max: u64,
    /// Expired-form sweep interval in seconds
    pub sweep_interval: u64,
    /// Directory holding the JSON files of the draft-form store
    pub form_storage_dir: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `RESPONSE_CACHE_TTL` - GET-response cache TTL in seconds (default: 3600)
    /// - `RATE_LIMIT_WINDOW` - rate-limit window in seconds (default: 3600)
    /// - `RATE_LIMIT_MAX` - submissions allowed per window (default: 5)
    /// - `SWEEP_INTERVAL` - expired-form sweep cadence in seconds (default: 3600)
    /// - `FORM_STORAGE_DIR` - draft-store directory (default: "data")
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            response_cache_ttl: env::var("RESPONSE_CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            rate_limit_window: env::var("RATE_LIMIT_WINDOW")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            rate_limit_max: env::var("RATE_LIMIT_MAX")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            sweep_interval: env::var("SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            form_storage_dir: env::var("FORM_STORAGE_DIR")
                .unwrap_or_else(|_| "data".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            response_cache_ttl: 3600,
            rate_limit_window: 3600,
            rate_limit_max: 5,
            sweep_interval: 3600,
            form_storage_dir: "data".to_string(),
        }
    }
}
