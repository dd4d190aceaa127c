//! # IndexDesk Domain
//!
//! Domain types and models for the IndexDesk admin API.
//!
//! This crate contains:
//! - Domain error type and Result alias
//! - Configuration structures
//! - Domain constants (endpoints, defaults)
//! - Admin and URL indexation records
//!
//! ## Architecture
//! - No dependencies on other IndexDesk crates
//! - Pure data, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
