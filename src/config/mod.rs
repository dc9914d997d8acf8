//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → schema.rs (fill server_url/token from FRUIT_PI_* env vars)
//!     → validation.rs (semantic checks)
//!     → ProviderConfig (validated, immutable)
//!     → ProviderContext::from_config builds the client once
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{finalize, load_config, parse_config, ConfigError};
pub use schema::ObservabilityConfig;
pub use schema::ProviderConfig;
pub use schema::RetryConfig;
pub use schema::TimeoutConfig;
pub use schema::{SERVER_URL_ENV, TOKEN_ENV};
