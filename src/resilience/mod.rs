//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request from the API client:
//!     → retries.rs (send, classify outcome)
//!     → On retryable outcome: backoff.rs (jittered delay), then send again
//!     → On anything else, or when the ceiling is hit: return outcome unchanged
//! ```
//!
//! # Design Decisions
//! - Retry lives only in the transport chain, never in the API client or reconciler
//! - The ceiling is explicit: attempt count plus elapsed-time budget
//! - Backoff sleeps honor cancellation so callers are never pinned

pub mod backoff;
pub mod retries;

pub use retries::{RetryLayer, RetryMiddleware, RetryPolicy};
