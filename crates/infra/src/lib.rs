//! # IndexDesk Infrastructure
//!
//! Everything that talks to the backend.
//!
//! This crate contains:
//! - The request pipeline: auth header injection, 401 token refresh with
//!   request queuing, retry with exponential backoff
//! - The normalized [`ApiError`](api::ApiError) every call fails with
//! - The current-identity cache and typed endpoint wrappers
//! - Configuration loading and logging setup
//!
//! ## Architecture
//! - Pure data and defaults live in `indexdesk-domain`
//! - Clock and backoff primitives come from `indexdesk-common`

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use api::{ApiClient, ApiCommands, ApiError, IdentityCache, IdentityOptions};
pub use errors::{RefreshError, RequestFailure, TransportKind};
pub use http::{HttpClient, RefreshTokenHandler, RequestConfig, RetryPolicy};
