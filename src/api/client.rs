//! Device-management API client.
//!
//! # Responsibilities
//! - Expose the six remote operations as typed async calls
//! - Mark which operations are safe to re-send
//! - Assemble the default transport chain (Retry → Auth → Network)
//!
//! # Design Decisions
//! - One request/response round-trip per call, no retry here
//! - Config text is checked before any network I/O
//! - `DeviceApi` is the seam the reconciler depends on

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use url::Url;

use crate::api::codec::{build_request, decode_response, push_path_segment};
use crate::api::error::{ApiError, ApiResult, ClientBuildError};
use crate::api::types::{
    parse_config, ConfigureDeviceRequest, Device, GetDeviceTokenRequest, InsertReadingRequest,
    Measurement, Reading, RegistrationRequest,
};
use crate::config::validation::validate_config;
use crate::config::{ProviderConfig, RetryConfig};
use crate::resilience::{RetryLayer, RetryMiddleware, RetryPolicy};
use crate::security::{AuthLayer, AuthMiddleware};
use crate::transport::{ApiRequest, HttpSend, NetworkSender};

pub const GET_DEVICE_CONFIG_PATH: &str = "/api/v1/get-device-config";
pub const REGISTER_DEVICE_PATH: &str = "/api/v1/register-device";
pub const CONFIGURE_DEVICE_PATH: &str = "/api/v1/configure-device";
pub const GET_DEVICE_TOKEN_PATH: &str = "/api/v1/get-device-token";
pub const INSERT_READING_PATH: &str = "/api/v1/insert-reading";

/// Remote operations of the device-management service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceApi: Send + Sync {
    /// Config of the device the bearer credential belongs to.
    async fn get_device_config(&self) -> ApiResult<Device>;

    async fn get_device_config_for(&self, device_uuid: &str) -> ApiResult<Device>;

    /// Register a new device. The server assigns its UUID and token.
    async fn register_device(&self, name: &str, config: &str) -> ApiResult<Device>;

    async fn configure_device(&self, device_uuid: &str, name: &str, config: &str)
        -> ApiResult<Device>;

    async fn get_device_token_for(&self, device_uuid: &str) -> ApiResult<Device>;

    async fn insert_reading(
        &self,
        temperature: &Measurement,
        humidity: &Measurement,
    ) -> ApiResult<Reading>;
}

/// The chain used outside of tests.
pub type DefaultSender = RetryMiddleware<AuthMiddleware<NetworkSender>>;

/// Compose Retry → Auth → `network`.
pub fn default_chain(
    token: &str,
    retries: &RetryConfig,
    network: NetworkSender,
) -> Result<DefaultSender, ClientBuildError> {
    Ok(ServiceBuilder::new()
        .layer(RetryLayer::new(RetryPolicy::from_config(retries)))
        .layer(AuthLayer::bearer(token)?)
        .service(network))
}

/// [`DeviceApi`] over any [`HttpSend`] chain.
#[derive(Debug, Clone)]
pub struct ApiClient<S> {
    base_url: Url,
    sender: S,
    cancellation: Option<CancellationToken>,
}

impl<S: HttpSend> ApiClient<S> {
    pub fn new(base_url: Url, sender: S) -> Self {
        Self {
            base_url,
            sender,
            cancellation: None,
        }
    }

    /// Requests from the returned client stop when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn sender(&self) -> &S {
        &self.sender
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        mut request: ApiRequest,
    ) -> ApiResult<T> {
        request.cancellation = self.cancellation.clone();
        tracing::debug!(
            operation,
            method = %request.method,
            url = %request.url,
            "Sending API request"
        );

        let response = self
            .sender
            .send(request)
            .await
            .map_err(|source| ApiError::Transport { operation, source })?;

        tracing::debug!(operation, status = %response.status, "API response received");
        decode_response(response)
    }
}

impl ApiClient<DefaultSender> {
    /// Client over the default chain with the configured timeouts.
    pub fn with_default_chain(
        base_url: Url,
        token: &str,
        config: &ProviderConfig,
    ) -> Result<Self, ClientBuildError> {
        let network = NetworkSender::new(&config.timeouts)?;
        let sender = default_chain(token, &config.retries, network)?;
        Ok(Self::new(base_url, sender))
    }

    /// Client for the configured server and credential.
    ///
    /// The config is validated first; an empty `server_url` or `token` is rejected.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ClientBuildError> {
        validate_config(config).map_err(ClientBuildError::InvalidConfig)?;
        let server_url = config.normalized_server_url();
        let base_url = Url::parse(server_url).map_err(|e| ClientBuildError::InvalidServerUrl {
            url: server_url.to_string(),
            reason: e.to_string(),
        })?;
        Self::with_default_chain(base_url, &config.token, config)
    }
}

#[async_trait]
impl<S: HttpSend> DeviceApi for ApiClient<S> {
    async fn get_device_config(&self) -> ApiResult<Device> {
        let request = build_request::<()>(&self.base_url, Method::GET, GET_DEVICE_CONFIG_PATH, None)?;
        self.execute("get-device-config", request).await
    }

    async fn get_device_config_for(&self, device_uuid: &str) -> ApiResult<Device> {
        let mut request =
            build_request::<()>(&self.base_url, Method::GET, GET_DEVICE_CONFIG_PATH, None)?;
        push_path_segment(&mut request, device_uuid)?;
        self.execute("get-device-config", request).await
    }

    async fn register_device(&self, name: &str, config: &str) -> ApiResult<Device> {
        let config = parse_config(config)?;
        let body = RegistrationRequest {
            name,
            config: &config,
        };
        let mut request =
            build_request(&self.base_url, Method::POST, REGISTER_DEVICE_PATH, Some(&body))?;
        // Each accepted registration creates a new device.
        request.idempotent = false;
        self.execute("register-device", request).await
    }

    async fn configure_device(
        &self,
        device_uuid: &str,
        name: &str,
        config: &str,
    ) -> ApiResult<Device> {
        let config = parse_config(config)?;
        let body = ConfigureDeviceRequest {
            device_uuid,
            name,
            config: &config,
        };
        let mut request =
            build_request(&self.base_url, Method::POST, CONFIGURE_DEVICE_PATH, Some(&body))?;
        // Full overwrite of name and config.
        request.idempotent = true;
        self.execute("configure-device", request).await
    }

    async fn get_device_token_for(&self, device_uuid: &str) -> ApiResult<Device> {
        let body = GetDeviceTokenRequest { device_uuid };
        let mut request =
            build_request(&self.base_url, Method::POST, GET_DEVICE_TOKEN_PATH, Some(&body))?;
        request.idempotent = true;
        self.execute("get-device-token", request).await
    }

    async fn insert_reading(
        &self,
        temperature: &Measurement,
        humidity: &Measurement,
    ) -> ApiResult<Reading> {
        let body = InsertReadingRequest {
            temperature_celsius: temperature,
            relative_humidity: humidity,
        };
        let mut request =
            build_request(&self.base_url, Method::POST, INSERT_READING_PATH, Some(&body))?;
        request.idempotent = false;
        self.execute("insert-reading", request).await
    }
}
