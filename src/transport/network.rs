//! Base sender that puts requests on the wire.
//!
//! # Responsibilities
//! - Own the pooled `reqwest::Client`
//! - Enforce connect and request timeouts
//! - Stop waiting as soon as the caller cancels

use std::time::Duration;

use async_trait::async_trait;

use crate::config::TimeoutConfig;
use crate::transport::{ApiRequest, ApiResponse, HttpSend, TransportError};

/// Innermost link of the chain. Clones share one connection pool.
#[derive(Debug, Clone)]
pub struct NetworkSender {
    client: reqwest::Client,
}

impl NetworkSender {
    /// Create a sender with the configured timeouts.
    pub fn new(timeouts: &TimeoutConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.request_secs))
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let response = self
            .client
            .request(request.method, request.url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = match response.bytes().await {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(e) => {
                tracing::warn!(status = %status, error = %e, "Failed to read response body");
                None
            }
        };

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl HttpSend for NetworkSender {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        match request.cancellation.clone() {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(TransportError::Cancelled),
                    result = self.dispatch(request) => result,
                }
            }
            None => self.dispatch(request).await,
        }
    }
}
