//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the provider.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Environment variable consulted when `server_url` is not set.
pub const SERVER_URL_ENV: &str = "FRUIT_PI_SERVER_URL";

/// Environment variable consulted when `token` is not set.
pub const TOKEN_ENV: &str = "FRUIT_PI_ADMIN_JWT";

/// Root configuration for the provider.
#[derive(Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the device-management server.
    pub server_url: String,

    /// Bearer credential attached to every request.
    pub token: String,

    /// Retry configuration.
    pub retries: RetryConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("server_url", &self.server_url)
            .field("token", &"<redacted>")
            .field("retries", &self.retries)
            .field("timeouts", &self.timeouts)
            .field("observability", &self.observability)
            .finish()
    }
}

impl ProviderConfig {
    /// Defaults plus whatever the environment provides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_defaults();
        config
    }

    /// Fill empty `server_url`/`token` from the process environment.
    pub fn apply_env_defaults(&mut self) {
        self.apply_defaults_from(|key| std::env::var(key).ok());
    }

    /// Fill empty `server_url`/`token` from `lookup`.
    pub fn apply_defaults_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.server_url.is_empty() {
            if let Some(url) = lookup(SERVER_URL_ENV) {
                self.server_url = url;
            }
        }
        if self.token.is_empty() {
            if let Some(token) = lookup(TOKEN_ENV) {
                self.token = token;
            }
        }
    }

    /// Server URL without its trailing slash; API paths carry their own.
    pub fn normalized_server_url(&self) -> &str {
        self.server_url
            .strip_suffix('/')
            .unwrap_or(&self.server_url)
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retries.
    pub enabled: bool,

    /// Maximum number of attempts, the first one included.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for a single backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Total time budget for one request including all retries, in milliseconds.
    pub max_elapsed_ms: u64,

    /// Also retry requests that are not idempotent (register, insert-reading).
    pub retry_non_idempotent: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 5,
            base_delay_ms: 100,
            max_delay_ms: 1000,
            max_elapsed_ms: 10_000,
            retry_non_idempotent: true,
        }
    }
}

/// Timeout configuration for network operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for one attempt) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
