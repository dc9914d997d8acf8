//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProviderConfig;
use crate::config::validation::{join_errors, validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// Parse a TOML file without applying defaults or validating.
pub fn parse_config(path: &Path) -> Result<ProviderConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config_str(&content)
}

/// Parse TOML text without applying defaults or validating.
pub fn parse_config_str(content: &str) -> Result<ProviderConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Apply environment defaults and validate.
pub fn finalize(mut config: ProviderConfig) -> Result<ProviderConfig, ConfigError> {
    config.apply_env_defaults();
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load, fill from the environment, and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProviderConfig, ConfigError> {
    let config = parse_config(path)?;
    let config = finalize(config)?;

    tracing::debug!(
        path = %path.display(),
        server_url = %config.normalized_server_url(),
        "Configuration loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_file_keeps_defaults() {
        let config = parse_config_str(
            r#"
            server_url = "https://pi.example.com/"
            token = "jwt"

            [retries]
            max_attempts = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.server_url, "https://pi.example.com/");
        assert_eq!(config.retries.max_attempts, 3);
        assert_eq!(config.retries.base_delay_ms, 100);
        assert_eq!(config.timeouts.connect_secs, 5);
    }

    #[test]
    fn test_parse_error_surfaces() {
        let err = parse_config_str("server_url = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_message_lists_all_errors() {
        let err = ConfigError::Validation(vec![
            ValidationError::MissingServerUrl,
            ValidationError::MissingToken,
        ]);
        let message = err.to_string();
        assert!(message.contains("server_url is required"));
        assert!(message.contains("token is required"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = parse_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
