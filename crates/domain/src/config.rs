//! Configuration structures
//!
//! Every section has serde defaults, so a config file only needs the keys it
//! overrides.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_IDENTITY_TTL_MS, DEFAULT_LOG_LEVEL, DEFAULT_MAX_RETRIES,
    DEFAULT_RETRY_BASE_DELAY_MS, DEFAULT_TIMEOUT_MS,
};

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub identity: IdentityCacheConfig,
    pub logging: LoggingConfig,
}

/// Request pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend origin; request paths are appended to it
    pub base_url: String,
    pub timeout_ms: u64,
    /// Retries after the initial attempt for transient failures
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    /// Request/response debug lines. `None` means on in debug builds only.
    pub logging: Option<bool>,
}

impl ApiConfig {
    /// Config pointing at `base_url` with every other field defaulted
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Self::default() }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    /// Resolved logging switch
    pub fn logging_enabled(&self) -> bool {
        self.logging.unwrap_or(cfg!(debug_assertions))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            logging: None,
        }
    }
}

/// Identity cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityCacheConfig {
    pub ttl_ms: u64,
}

impl IdentityCacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

impl Default for IdentityCacheConfig {
    fn default() -> Self {
        Self { ttl_ms: DEFAULT_IDENTITY_TTL_MS }
    }
}

/// Tracing subscriber configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `indexdesk_infra=debug`
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: DEFAULT_LOG_LEVEL.to_string(), json: false }
    }
}
