//! Failure injection tests for the transport chain and reconciler.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use fruitpi_provider::api::{default_chain, ApiClient, ApiError, DeviceApi};
use fruitpi_provider::config::RetryConfig;
use fruitpi_provider::reconciler::{DeviceState, ProviderContext, ProviderError};
use fruitpi_provider::transport::NetworkSender;
use tokio_util::sync::CancellationToken;

mod common;

#[tokio::test]
async fn test_configure_retried_after_503() {
    let call_count = Arc::new(AtomicU32::new(0));
    let cc = call_count.clone();
    let backend = common::start_programmable_backend(move |req| {
        let cc = cc.clone();
        async move {
            if req.path.starts_with("/api/v1/get-device-config") {
                return (200, r#"{"device_uuid":"abc","name":"n","config":{}}"#.to_string());
            }
            let count = cc.fetch_add(1, Ordering::SeqCst);
            if count < 2 {
                (503, "Service Unavailable".into())
            } else {
                (200, r#"{"device_uuid":"abc"}"#.into())
            }
        }
    })
    .await;

    let retries = RetryConfig {
        base_delay_ms: 100,
        max_delay_ms: 1000,
        ..RetryConfig::default()
    };
    let ctx = ProviderContext::new(common::client_for(&backend, "tkn", retries));
    let mut state = DeviceState {
        id: Some("abc".into()),
        name: "n".into(),
        config: "{}".into(),
    };

    let start = Instant::now();
    ctx.devices().update(&mut state).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(call_count.load(Ordering::SeqCst), 3);
    // Two backoffs: [100, 200] ms then [100, 400] ms.
    assert!(elapsed >= Duration::from_millis(200), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(3), "elapsed {elapsed:?}");

    let configure_calls: Vec<_> = backend
        .requests()
        .into_iter()
        .filter(|r| r.path == "/api/v1/configure-device")
        .collect();
    assert_eq!(configure_calls.len(), 3);
    for req in &configure_calls {
        assert_eq!(req.header("authorization"), vec!["Bearer tkn"]);
        assert_eq!(req.body, r#"{"device_uuid":"abc","name":"n","config":{}}"#);
    }
}

#[tokio::test]
async fn test_404_not_retried() {
    let backend = common::start_mock_backend(404, "not found").await;
    let ctx = ProviderContext::new(common::client_for(&backend, "tkn", common::fast_retries()));

    let mut state = DeviceState {
        id: Some("missing".into()),
        ..Default::default()
    };
    let err = ctx.devices().read(&mut state).await.unwrap_err();

    match err {
        ProviderError::Api(ApiError::Status { status, body, .. }) => {
            assert_eq!(status, 404);
            assert_eq!(body, "not found");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(backend.requests().len(), 1);
    assert_eq!(state.id.as_deref(), Some("missing"));
}

#[tokio::test]
async fn test_retries_exhausted() {
    let backend = common::start_mock_backend(500, "boom").await;
    let retries = RetryConfig {
        max_attempts: 3,
        ..common::fast_retries()
    };
    let client = common::client_for(&backend, "tkn", retries);

    let err = client.get_device_config().await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(backend.requests().len(), 3);
}

#[tokio::test]
async fn test_failed_registration_assigns_no_id() {
    let backend = common::start_mock_backend(503, "unavailable").await;
    let retries = RetryConfig {
        max_attempts: 2,
        ..common::fast_retries()
    };
    let ctx = ProviderContext::new(common::client_for(&backend, "tkn", retries));

    let mut state = DeviceState::new("thermo1", "{}");
    let err = ctx.devices().create(&mut state).await.unwrap_err();

    assert!(matches!(err, ProviderError::Api(ApiError::Status { status: 503, .. })));
    assert_eq!(state.id, None);
    assert_eq!(backend.requests().len(), 2);
}

#[tokio::test]
async fn test_registration_not_retried_when_disallowed() {
    let backend = common::start_mock_backend(503, "unavailable").await;
    let retries = RetryConfig {
        retry_non_idempotent: false,
        ..common::fast_retries()
    };
    let client = common::client_for(&backend, "tkn", retries);

    let err = client.register_device("thermo1", "{}").await.unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert_eq!(backend.requests().len(), 1);
}

#[tokio::test]
async fn test_malformed_json_not_retried() {
    let backend = common::start_mock_backend(200, "<html>oops</html>").await;
    let client = common::client_for(&backend, "tkn", common::fast_retries());

    let err = client.get_device_config_for("abc").await.unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)));
    assert_eq!(backend.requests().len(), 1);
}

#[tokio::test]
async fn test_cancel_interrupts_backoff() {
    let backend = common::start_mock_backend(503, "unavailable").await;
    let retries = RetryConfig {
        max_attempts: 10,
        base_delay_ms: 5_000,
        max_delay_ms: 10_000,
        max_elapsed_ms: 60_000,
        ..RetryConfig::default()
    };
    let cancel = CancellationToken::new();
    let client = common::client_for(&backend, "tkn", retries).with_cancellation(cancel.clone());

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let start = Instant::now();
    let result = client.get_device_config().await;

    assert!(start.elapsed() < Duration::from_secs(3));
    // Cancelled mid-backoff, the last outcome is returned.
    assert_eq!(result.unwrap_err().status(), Some(503));
    assert_eq!(backend.requests().len(), 1);
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let retries = RetryConfig {
        max_attempts: 2,
        ..common::fast_retries()
    };
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    let sender = default_chain("tkn", &retries, NetworkSender::from_client(http)).unwrap();
    // Nothing listens on the discard port.
    let client = ApiClient::new("http://127.0.0.1:9".parse().unwrap(), sender);

    let err = client.get_device_config().await.unwrap_err();

    assert!(matches!(err, ApiError::Transport { operation: "get-device-config", .. }));
}
