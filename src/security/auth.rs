//! Bearer authentication for outgoing requests.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use thiserror::Error;
use tower::Layer;

use crate::transport::{ApiRequest, ApiResponse, HttpSend, TransportError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("bearer token is not a valid header value")]
    InvalidToken,
}

/// Wraps a sender with [`AuthMiddleware`].
#[derive(Debug, Clone)]
pub struct AuthLayer {
    header: HeaderValue,
}

impl AuthLayer {
    /// Build the `Authorization: Bearer <token>` value once, up front.
    pub fn bearer(token: &str) -> Result<Self, AuthError> {
        let mut header = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| AuthError::InvalidToken)?;
        header.set_sensitive(true);
        Ok(Self { header })
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            header: self.header.clone(),
        }
    }
}

/// Sets the bearer credential on every request, replacing any earlier value.
#[derive(Debug, Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    header: HeaderValue,
}

#[async_trait]
impl<S: HttpSend> HttpSend for AuthMiddleware<S> {
    async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, TransportError> {
        request.headers.insert(AUTHORIZATION, self.header.clone());
        self.inner.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::CONTENT_TYPE;
    use reqwest::{Method, StatusCode};
    use std::sync::{Arc, Mutex};
    use url::Url;

    /// Records every request it sees and answers 200.
    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<ApiRequest>>,
    }

    #[async_trait]
    impl HttpSend for Recorder {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
            self.seen.lock().unwrap().push(request);
            Ok(ApiResponse::new(StatusCode::OK, Vec::new()))
        }
    }

    fn request(method: Method, path: &str) -> ApiRequest {
        let url = Url::parse("http://pi.local").unwrap().join(path).unwrap();
        ApiRequest::new(method, url)
    }

    #[tokio::test]
    async fn test_sets_single_bearer_header() {
        let recorder = Arc::new(Recorder::default());
        let auth = AuthLayer::bearer("tkn").unwrap().layer(recorder.clone());

        for (method, path) in [
            (Method::GET, "/api/v1/get-device-config"),
            (Method::POST, "/api/v1/register-device"),
        ] {
            auth.send(request(method, path)).await.unwrap();
        }

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        for req in seen.iter() {
            let values: Vec<_> = req.headers.get_all(AUTHORIZATION).iter().collect();
            assert_eq!(values.len(), 1);
            assert_eq!(values[0], "Bearer tkn");
        }
    }

    #[tokio::test]
    async fn test_overwrites_existing_authorization() {
        let recorder = Arc::new(Recorder::default());
        let auth = AuthLayer::bearer("fresh").unwrap().layer(recorder.clone());

        let mut req = request(Method::GET, "/api/v1/get-device-config");
        req.headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer stale"));
        req.headers.append(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        auth.send(req).await.unwrap();

        let seen = recorder.seen.lock().unwrap();
        let values: Vec<_> = seen[0].headers.get_all(AUTHORIZATION).iter().collect();
        assert_eq!(values, vec![&HeaderValue::from_static("Bearer fresh")]);
    }

    #[tokio::test]
    async fn test_leaves_body_and_other_headers_alone() {
        let recorder = Arc::new(Recorder::default());
        let auth = AuthLayer::bearer("tkn").unwrap().layer(recorder.clone());

        let mut req = request(Method::POST, "/api/v1/configure-device");
        req.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        req.body = br#"{"device_uuid":"abc"}"#.to_vec();
        auth.send(req).await.unwrap();

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen[0].body, br#"{"device_uuid":"abc"}"#.to_vec());
        assert_eq!(seen[0].headers.len(), 2);
        assert_eq!(seen[0].headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_rejects_token_with_control_characters() {
        assert_eq!(AuthLayer::bearer("bad\ntoken").unwrap_err(), AuthError::InvalidToken);
    }

    #[test]
    fn test_token_hidden_from_debug() {
        let layer = AuthLayer::bearer("super-secret").unwrap();
        assert!(!format!("{:?}", layer).contains("super-secret"));
    }
}
