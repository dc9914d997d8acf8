//! Device token lookup (`fruitpi_device_token`).

use serde::Serialize;

use crate::api::DeviceApi;
use crate::reconciler::error::{ProviderError, ProviderResult};
use crate::reconciler::schema::{Attributes, SchemaError, DEVICE_TOKEN_SCHEMA};

/// Input and computed output of one token lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceTokenState {
    /// Set to `device_uuid` once the lookup succeeds.
    pub id: Option<String>,
    pub device_uuid: String,
    pub token: Option<String>,
}

impl DeviceTokenState {
    pub fn new(device_uuid: impl Into<String>) -> Self {
        Self {
            device_uuid: device_uuid.into(),
            ..Default::default()
        }
    }

    pub fn from_attributes(attributes: &Attributes) -> Result<Self, SchemaError> {
        let mut resolved = DEVICE_TOKEN_SCHEMA.resolve(attributes)?;
        Ok(Self::new(resolved.remove("device_uuid").unwrap_or_default()))
    }

    pub fn to_attributes(&self) -> Attributes {
        let mut attributes = Attributes::from([("device_uuid".to_string(), self.device_uuid.clone())]);
        if let Some(token) = &self.token {
            attributes.insert("token".to_string(), token.clone());
        }
        attributes
    }
}

#[derive(Debug)]
pub struct DeviceTokenLookup<'a, A> {
    api: &'a A,
}

impl<'a, A: DeviceApi> DeviceTokenLookup<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Fetch the device's token. A response without one is an error.
    pub async fn read(&self, state: &mut DeviceTokenState) -> ProviderResult<()> {
        let device = self.api.get_device_token_for(&state.device_uuid).await?;
        let token = device
            .token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ProviderError::TokenNotObtained {
                device_uuid: state.device_uuid.clone(),
            })?;

        tracing::debug!(device_uuid = %state.device_uuid, "Device token obtained");
        state.token = Some(token);
        state.id = Some(state.device_uuid.clone());
        Ok(())
    }
}
