//! Error types used outside the request pipeline

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for IndexDesk setup and configuration
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum IndexDeskError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for IndexDesk operations
pub type Result<T> = std::result::Result<T, IndexDeskError>;
