//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the server URL is a usable http(s) base
//! - Validate value ranges (attempts >= 1, delays ordered, timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProviderConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::ProviderConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("server_url is required (set it or FRUIT_PI_SERVER_URL)")]
    MissingServerUrl,

    #[error("server_url `{url}` is invalid: {reason}")]
    InvalidServerUrl { url: String, reason: String },

    #[error("token is required (set it or FRUIT_PI_ADMIN_JWT)")]
    MissingToken,

    #[error("retries.max_attempts must be at least 1")]
    NoAttempts,

    #[error("retries.base_delay_ms must be greater than 0")]
    ZeroBaseDelay,

    #[error("retries.max_delay_ms ({max}) is below retries.base_delay_ms ({base})")]
    DelayRangeInverted { base: u64, max: u64 },

    #[error("timeouts.request_secs must be greater than 0")]
    ZeroRequestTimeout,
}

/// Render a list of problems as one line.
pub fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validate a fully assembled configuration.
pub fn validate_config(config: &ProviderConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server_url.is_empty() {
        errors.push(ValidationError::MissingServerUrl);
    } else {
        match Url::parse(config.normalized_server_url()) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(ValidationError::InvalidServerUrl {
                url: config.server_url.clone(),
                reason: format!("unsupported scheme `{}`", url.scheme()),
            }),
            Err(e) => errors.push(ValidationError::InvalidServerUrl {
                url: config.server_url.clone(),
                reason: e.to_string(),
            }),
        }
    }

    if config.token.is_empty() {
        errors.push(ValidationError::MissingToken);
    }

    let retries = &config.retries;
    if retries.max_attempts == 0 {
        errors.push(ValidationError::NoAttempts);
    }
    if retries.base_delay_ms == 0 {
        errors.push(ValidationError::ZeroBaseDelay);
    }
    if retries.max_delay_ms < retries.base_delay_ms {
        errors.push(ValidationError::DelayRangeInverted {
            base: retries.base_delay_ms,
            max: retries.max_delay_ms,
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
