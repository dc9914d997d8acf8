//! Retry logic.
//!
//! # Responsibilities
//! - Determine if an outcome is retryable (transient error, 425, 429, 5xx)
//! - Execute retries with exponential backoff + jitter
//! - Enforce the retry ceiling (max attempts, max elapsed time)
//!
//! # Design Decisions
//! - Every other 4xx and every 2xx is returned untouched
//! - Non-idempotent requests are retried only when the policy allows it
//! - The backoff sleep races the request's cancellation token
//! - After the last attempt the final outcome is returned as-is

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tower::Layer;

use crate::config::RetryConfig;
use crate::resilience::backoff::calculate_backoff;
use crate::transport::{ApiRequest, ApiResponse, HttpSend, TransportError};

/// Why an outcome was judged retryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    Transient,
    Status(StatusCode),
}

impl fmt::Display for RetryReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryReason::Transient => write!(f, "transient network error"),
            RetryReason::Status(status) => write!(f, "status {}", status.as_u16()),
        }
    }
}

/// 425 Too Early, 429 Too Many Requests and the whole 500-999 band.
pub fn is_retryable_status(status: StatusCode) -> bool {
    let code = status.as_u16();
    code == 425 || code == 429 || (500..1000).contains(&code)
}

/// Classify an attempt's outcome.
pub fn retry_reason(outcome: &Result<ApiResponse, TransportError>) -> Option<RetryReason> {
    match outcome {
        Ok(response) if is_retryable_status(response.status) => {
            Some(RetryReason::Status(response.status))
        }
        Ok(_) => None,
        Err(err) if err.is_transient() => Some(RetryReason::Transient),
        Err(_) => None,
    }
}

/// Limits and delays applied by [`RetryMiddleware`].
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_elapsed: Duration,
    pub retry_non_idempotent: bool,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: if config.enabled {
                config.max_attempts.max(1)
            } else {
                1
            },
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
            max_elapsed: Duration::from_millis(config.max_elapsed_ms),
            retry_non_idempotent: config.retry_non_idempotent,
        }
    }

    /// Whether this request may be re-sent at all.
    pub fn allows(&self, request: &ApiRequest) -> bool {
        request.idempotent || self.retry_non_idempotent
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Wraps a sender with [`RetryMiddleware`].
#[derive(Debug, Clone)]
pub struct RetryLayer {
    policy: RetryPolicy,
}

impl RetryLayer {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }
}

impl<S> Layer<S> for RetryLayer {
    type Service = RetryMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RetryMiddleware {
            inner,
            policy: self.policy.clone(),
        }
    }
}

/// Re-issues retryable requests with jittered exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryMiddleware<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S> RetryMiddleware<S> {
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

/// Sleep for `delay` unless cancelled first. Returns false on cancellation.
async fn backoff_sleep(delay: Duration, cancellation: Option<&CancellationToken>) -> bool {
    match cancellation {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => false,
                _ = tokio::time::sleep(delay) => true,
            }
        }
        None => {
            tokio::time::sleep(delay).await;
            true
        }
    }
}

#[async_trait]
impl<S: HttpSend> HttpSend for RetryMiddleware<S> {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let started = Instant::now();
        let mut attempt: u32 = 1;

        loop {
            let outcome = self.inner.send(request.clone()).await;

            let Some(reason) = retry_reason(&outcome) else {
                return outcome;
            };

            if !self.policy.allows(&request) {
                tracing::debug!(
                    method = %request.method,
                    url = %request.url,
                    reason = %reason,
                    "Not retrying non-idempotent request"
                );
                return outcome;
            }

            if attempt >= self.policy.max_attempts {
                tracing::warn!(
                    method = %request.method,
                    url = %request.url,
                    attempts = attempt,
                    reason = %reason,
                    "Retry attempts exhausted"
                );
                return outcome;
            }

            if request.is_cancelled() {
                tracing::debug!(url = %request.url, "Request cancelled, not retrying");
                return outcome;
            }

            let delay = calculate_backoff(attempt, self.policy.base_delay_ms, self.policy.max_delay_ms);
            if started.elapsed() + delay > self.policy.max_elapsed {
                tracing::warn!(
                    method = %request.method,
                    url = %request.url,
                    attempts = attempt,
                    elapsed = ?started.elapsed(),
                    "Retry time budget exhausted"
                );
                return outcome;
            }

            tracing::warn!(
                method = %request.method,
                url = %request.url,
                attempt = attempt,
                delay = ?delay,
                reason = %reason,
                "Retrying request"
            );

            if !backoff_sleep(delay, request.cancellation.as_ref()).await {
                tracing::debug!(url = %request.url, "Cancelled during backoff");
                return outcome;
            }

            attempt += 1;
        }
    }
}
