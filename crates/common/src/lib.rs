//! Common utilities shared across IndexDesk crates.
//!
//! # Feature Tiers
//!
//! - default: clock abstraction and retry backoff
//! - `test-utils`: [`testing::MockClock`] for deterministic time in tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod resilience;
pub mod time;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

pub use resilience::backoff::ExponentialBackoff;
pub use time::{Clock, SystemClock};
