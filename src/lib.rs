//! Fruit-pi device provider.
//!
//! Reconciles declarative device resources against the fruit-pi
//! device-management API over an explicit transport chain.

pub mod api;
pub mod config;
pub mod observability;
pub mod reconciler;
pub mod resilience;
pub mod security;
pub mod transport;

pub use api::{ApiClient, DeviceApi};
pub use config::ProviderConfig;
pub use reconciler::ProviderContext;
