//! JSON request/response codec.
//!
//! # Responsibilities
//! - Resolve endpoint paths against the server URL
//! - Serialize request bodies and set the fixed request headers
//! - Turn a response into a decoded value or an [`ApiError`]

use reqwest::header::{HeaderValue, ACCEPT, CACHE_CONTROL, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::api::error::{ApiError, ApiResult};
use crate::transport::{ApiRequest, ApiResponse};

pub const USER_AGENT_VALUE: &str = concat!("fruitpi-provider/", env!("CARGO_PKG_VERSION"));

/// Shown in place of an error body that could not be read.
pub const UNREADABLE_BODY: &str = "<error reading body>";

/// Build a request for `path` relative to `base_url`.
///
/// Any path prefix on the server URL is kept. Bodyless requests still carry
/// the JSON content type.
pub fn build_request<T: Serialize + ?Sized>(
    base_url: &Url,
    method: Method,
    path: &str,
    body: Option<&T>,
) -> ApiResult<ApiRequest> {
    let joined = format!("{}{}", base_url.as_str().trim_end_matches('/'), path);
    let url = Url::parse(&joined).map_err(|e| ApiError::InvalidUrl {
        url: joined.clone(),
        reason: e.to_string(),
    })?;

    let mut request = ApiRequest::new(method, url);
    if let Some(body) = body {
        request.body = serde_json::to_vec(body).map_err(ApiError::Encode)?;
    }

    let headers = &mut request.headers;
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));

    Ok(request)
}

/// Append one percent-encoded segment, e.g. a device UUID, to the request path.
pub fn push_path_segment(request: &mut ApiRequest, segment: &str) -> ApiResult<()> {
    let url = request.url.to_string();
    request
        .url
        .path_segments_mut()
        .map_err(|_| ApiError::InvalidUrl {
            url,
            reason: "URL cannot carry path segments".to_string(),
        })?
        .pop_if_empty()
        .push(segment);
    Ok(())
}

/// Decode a 200 body as `T`, or describe the failure.
pub fn decode_response<T: DeserializeOwned>(response: ApiResponse) -> ApiResult<T> {
    if response.status != StatusCode::OK {
        return Err(status_error(response));
    }
    let body = response.body.ok_or(ApiError::UnreadableBody)?;
    serde_json::from_slice(&body).map_err(ApiError::Decode)
}

fn status_error(response: ApiResponse) -> ApiError {
    let body = match response.body {
        Some(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        None => UNREADABLE_BODY.to_string(),
    };
    ApiError::Status {
        status: response.status.as_u16(),
        reason: response
            .status
            .canonical_reason()
            .unwrap_or("Unknown Status")
            .to_string(),
        body,
    }
}
