//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing request (after the retry layer):
//!     → auth.rs (set Authorization: Bearer <token>)
//!     → network sender
//! ```
//!
//! # Design Decisions
//! - The credential is validated once when the layer is built
//! - Header value is marked sensitive; it never shows up in Debug output or logs
//! - Pure decorator: no branching, no body access

pub mod auth;

pub use auth::{AuthError, AuthLayer, AuthMiddleware};
