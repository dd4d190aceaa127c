//! Logging setup
//!
//! The pipeline emits `tracing` events; this module installs the subscriber
//! that renders them.

pub mod logging;

pub use logging::{build_filter, init_logging};
