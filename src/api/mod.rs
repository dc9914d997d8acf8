//! Device-management API.
//!
//! # Data Flow
//! ```text
//! DeviceApi call (client.rs)
//!     → codec.rs (path, JSON body, fixed headers)
//!     → transport chain
//!     → codec.rs (200 → decoded value, else ApiError)
//! ```

pub mod client;
pub mod codec;
pub mod error;
pub mod types;

pub use client::{default_chain, ApiClient, DefaultSender, DeviceApi};
pub use error::{ApiError, ApiResult, ClientBuildError};
pub use types::{Device, Measurement, MeasurementError, Reading};
