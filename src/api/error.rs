//! API client errors.

use thiserror::Error;

use crate::config::validation::{join_errors, ValidationError};
use crate::security::AuthError;
use crate::transport::TransportError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("failed making {operation} request: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: TransportError,
    },

    /// The server answered with anything other than 200.
    #[error("HTTP error {status} {reason} with body `{body}`")]
    Status {
        status: u16,
        reason: String,
        body: String,
    },

    #[error("received malformed JSON response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("response body could not be read")]
    UnreadableBody,

    #[error("could not marshal request body into JSON: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("device config is not valid JSON: {0}")]
    InvalidConfig(#[source] serde_json::Error),

    #[error("invalid request URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ApiError {
    /// HTTP status of the failed exchange, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            ApiError::Transport {
                source: TransportError::Cancelled,
                ..
            }
        )
    }
}

/// Failure assembling the default transport chain.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("failed to build HTTP client: {0}")]
    Transport(#[from] TransportError),

    #[error("invalid provider config: {}", join_errors(.0))]
    InvalidConfig(Vec<ValidationError>),

    #[error("invalid server URL {url}: {reason}")]
    InvalidServerUrl { url: String, reason: String },
}
