//! Device resource (`fruitpi_device`).
//!
//! # Data Flow
//! ```text
//! create: register_device → adopt UUID → read
//! read:   get_device_config_for(id) → overwrite name/config
//! update: configure_device(id, ..) → read
//! delete: local only, no remote call
//! ```
//!
//! # Design Decisions
//! - Every verb works on a staged copy and commits only on full success
//! - A failed create never assigns an id
//! - The remote API has no delete endpoint, so delete just forgets the device

use serde::Serialize;

use crate::api::{Device, DeviceApi};
use crate::reconciler::error::{ProviderError, ProviderResult};
use crate::reconciler::schema::{Attributes, SchemaError, DEVICE_SCHEMA, EMPTY_CONFIG};

/// Local state of one managed device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceState {
    /// Remote device UUID, once registered.
    pub id: Option<String>,
    pub name: String,
    /// Device config as JSON text.
    pub config: String,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            config: EMPTY_CONFIG.to_string(),
        }
    }
}

impl DeviceState {
    pub fn new(name: impl Into<String>, config: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            config: config.into(),
        }
    }

    /// Build state from the orchestrator's attribute map.
    pub fn from_attributes(id: Option<String>, attributes: &Attributes) -> Result<Self, SchemaError> {
        let mut resolved = DEVICE_SCHEMA.resolve(attributes)?;
        Ok(Self {
            id,
            name: resolved.remove("name").unwrap_or_default(),
            config: resolved
                .remove("config")
                .unwrap_or_else(|| EMPTY_CONFIG.to_string()),
        })
    }

    pub fn to_attributes(&self) -> Attributes {
        Attributes::from([
            ("name".to_string(), self.name.clone()),
            ("config".to_string(), self.config.clone()),
        ])
    }

    /// Replace local name and config with what the server reports.
    fn absorb(&mut self, device: Device) {
        self.name = device.name.unwrap_or_default();
        self.config = device.config.unwrap_or_else(|| EMPTY_CONFIG.to_string());
    }

    fn require_id(&self, operation: &'static str) -> ProviderResult<&str> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(ProviderError::MissingId { operation })
    }
}

/// Reconciles [`DeviceState`] against the remote service.
#[derive(Debug)]
pub struct DeviceResource<'a, A> {
    api: &'a A,
}

impl<'a, A: DeviceApi> DeviceResource<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Register the device, adopt its UUID, then read it back.
    pub async fn create(&self, state: &mut DeviceState) -> ProviderResult<()> {
        let registered = self.api.register_device(&state.name, &state.config).await?;
        if registered.device_uuid.is_empty() {
            return Err(ProviderError::IdentityNotAssigned);
        }
        let device_uuid = registered.device_uuid;
        tracing::info!(device_uuid = %device_uuid, name = %state.name, "Device registered");

        let mut staged = state.clone();
        staged.id = Some(device_uuid.clone());
        if let Err(err) = self.read(&mut staged).await {
            tracing::warn!(device_uuid = %device_uuid, error = %err, "Registered device could not be read back");
            return Err(match err {
                ProviderError::Api(source) => ProviderError::CreatedButUnread {
                    device_uuid,
                    source,
                },
                other => other,
            });
        }

        *state = staged;
        Ok(())
    }

    /// Overwrite local name and config with the remote values.
    pub async fn read(&self, state: &mut DeviceState) -> ProviderResult<()> {
        let id = state.require_id("read")?;
        let device = self.api.get_device_config_for(id).await?;
        tracing::debug!(device_uuid = %id, "Device synced");
        state.absorb(device);
        Ok(())
    }

    /// Push local name and config, then re-sync.
    pub async fn update(&self, state: &mut DeviceState) -> ProviderResult<()> {
        let id = state.require_id("update")?;
        self.api.configure_device(id, &state.name, &state.config).await?;
        tracing::info!(device_uuid = %id, "Device configured");

        let mut staged = state.clone();
        self.read(&mut staged).await?;
        *state = staged;
        Ok(())
    }

    /// Forget the device. Never touches the network and never fails.
    pub fn delete(&self, state: &mut DeviceState) {
        if let Some(id) = &state.id {
            tracing::info!(device_uuid = %id, "Device removed from state; it stays registered remotely");
        }
        *state = DeviceState::default();
    }
}
