//! Resource reconciler.
//!
//! # Responsibilities
//! - Drive the `fruitpi_device` resource through create/read/update/delete
//! - Serve the `fruitpi_device_token` lookup
//! - Validate orchestrator attribute maps against their schemas
//!
//! # Design Decisions
//! - `ProviderContext` is built once and passed by reference; there is no
//!   global provider state
//! - Errors bubble up unchanged; nothing here retries

pub mod device;
pub mod device_token;
pub mod error;
pub mod schema;

pub use device::{DeviceResource, DeviceState};
pub use device_token::{DeviceTokenLookup, DeviceTokenState};
pub use error::{ProviderError, ProviderResult};
pub use schema::{Attributes, SchemaError};

use crate::api::{ApiClient, ClientBuildError, DefaultSender, DeviceApi};
use crate::config::ProviderConfig;

/// Everything a reconciliation call needs.
#[derive(Debug, Clone)]
pub struct ProviderContext<A> {
    api: A,
}

impl<A: DeviceApi> ProviderContext<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn devices(&self) -> DeviceResource<'_, A> {
        DeviceResource::new(&self.api)
    }

    pub fn device_tokens(&self) -> DeviceTokenLookup<'_, A> {
        DeviceTokenLookup::new(&self.api)
    }
}

impl ProviderContext<ApiClient<DefaultSender>> {
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ClientBuildError> {
        Ok(Self::new(ApiClient::from_config(config)?))
    }
}
