//! Transport chain.
//!
//! # Data Flow
//! ```text
//! ApiClient (codec builds ApiRequest)
//!     → resilience::retries (RetryMiddleware)
//!     → security::auth (AuthMiddleware)
//!     → network.rs (NetworkSender, reqwest)
//!     → ApiResponse back up the chain
//! ```
//!
//! # Design Decisions
//! - One capability per layer: `HttpSend::send`
//! - Middlewares are `tower::Layer`s, composed explicitly with `ServiceBuilder`
//! - Requests are plain values so a retry can re-issue the identical request
//! - Test doubles implement `HttpSend` directly, no network needed

pub mod network;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use url::Url;

pub use network::NetworkSender;

/// Errors raised before any HTTP status is available.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Connection could not be established or was dropped mid-request.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request did not complete in time.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The request failed for a reason that will not go away on retry.
    #[error("request failed: {0}")]
    Request(String),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The caller cancelled the operation.
    #[error("request cancelled")]
    Cancelled,
}

impl TransportError {
    /// Network-level failures that are worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, TransportError::Connect(_) | TransportError::Timeout(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() || err.is_request() {
            TransportError::Connect(err.to_string())
        } else if err.is_builder() {
            TransportError::InvalidRequest(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

/// An outgoing request as it travels through the chain.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    /// Whether re-sending the request has no additional remote effect.
    pub idempotent: bool,
    /// Cancellation signal shared with the caller.
    pub cancellation: Option<CancellationToken>,
}

impl ApiRequest {
    pub fn new(method: Method, url: Url) -> Self {
        let idempotent = method.is_idempotent();
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: Vec::new(),
            idempotent,
            cancellation: None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

/// A fully received response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// `None` when the body could not be read off the wire.
    pub body: Option<Vec<u8>>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Some(body.into()),
        }
    }

    /// A response whose body was lost while reading.
    pub fn unreadable(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

/// Sends a request and returns the response or a transport error.
#[async_trait]
pub trait HttpSend: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

#[async_trait]
impl<T: HttpSend + ?Sized> HttpSend for Arc<T> {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        (**self).send(request).await
    }
}
