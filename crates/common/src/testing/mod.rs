//! Testing utilities
//!
//! Enabled by the `test-utils` feature (and always inside this crate's own
//! tests).

pub mod time;

pub use time::MockClock;
