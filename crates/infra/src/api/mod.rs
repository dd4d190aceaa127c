//! Backend API surface
//!
//! - [`ApiClient`]: `request_json`/`request` plus the auth and logging hooks
//! - [`ApiError`]: the single normalized error every call fails with
//! - [`IdentityCache`]: TTL cache with in-flight de-duplication for the
//!   current-admin lookup
//! - [`ApiCommands`]: typed admin, auth and indexation endpoints

pub mod client;
pub mod endpoints;
pub mod errors;
pub mod identity;

pub use client::{ApiClient, ApiClientBuilder};
pub use endpoints::ApiCommands;
pub use errors::{ApiError, ApiErrorCategory, Normalize, UNKNOWN_ERROR_MESSAGE};
pub use identity::{IdentityCache, IdentityOptions};
