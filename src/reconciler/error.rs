//! Reconciler errors.

use thiserror::Error;

use crate::api::ApiError;
use crate::reconciler::schema::SchemaError;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Registration went through but the device could not be read back.
    /// The device exists remotely and can be imported by its UUID.
    #[error("device {device_uuid} was registered but could not be read back: {source}")]
    CreatedButUnread {
        device_uuid: String,
        #[source]
        source: ApiError,
    },

    #[error("did not obtain token for device {device_uuid}")]
    TokenNotObtained { device_uuid: String },

    #[error("server did not assign a device UUID")]
    IdentityNotAssigned,

    #[error("{operation} requires a device id")]
    MissingId { operation: &'static str },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

pub type ProviderResult<T> = Result<T, ProviderError>;
