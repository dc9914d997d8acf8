//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! transport, retries, reconciler:
//!     → tracing macros (structured fields)
//!     → logging.rs (EnvFilter + fmt layer on stderr)
//! ```
//!
//! # Design Decisions
//! - stdout stays reserved for command output
//! - `RUST_LOG` wins over the configured level
//! - Credentials never appear in log fields

pub mod logging;

pub use logging::init_logging;
