//! Outbound request pipeline
//!
//! - [`HttpClient`]: the configured client with auth injection, timing logs,
//!   401-driven token refresh and transient-failure retry
//! - [`RequestConfig`]: per-call method, path, body, headers and timeout
//! - [`RetryPolicy`]: which failures are retried and how long to wait
//! - [`RefreshCoordinator`]: single-flight token refresh with queued replay

pub mod client;
pub mod refresh;
pub mod request;
pub mod retry;

pub use client::{HttpClient, HttpClientBuilder, HttpResponse};
pub use refresh::{
    RefreshCoordinator, RefreshLease, RefreshSignal, RefreshTicket, RefreshTokenHandler,
    RefreshWaiter,
};
pub use request::RequestConfig;
pub use retry::RetryPolicy;
