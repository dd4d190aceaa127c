//! Resilience primitives
//!
//! - **Backoff**: exponential delay schedule for retried requests

pub mod backoff;

pub use backoff::ExponentialBackoff;
