//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `INDEXDESK_API_BASE_URL` is unset, falls back to a config file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `INDEXDESK_API_BASE_URL`: Backend base URL (required)
//! - `INDEXDESK_API_TIMEOUT_MS`: Per-request timeout in milliseconds
//! - `INDEXDESK_API_MAX_RETRIES`: Retries for transient failures
//! - `INDEXDESK_API_RETRY_BASE_DELAY_MS`: First backoff delay; doubles per retry
//! - `INDEXDESK_API_LOGGING`: Request/response logging (true/false)
//! - `INDEXDESK_IDENTITY_TTL_MS`: Identity cache TTL in milliseconds
//! - `INDEXDESK_LOG_LEVEL`: Default tracing filter
//! - `INDEXDESK_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./indexdesk.{json,toml}` or `./config.{json,toml}` (current working
//!    directory)
//! 2. The same names in the parent and grandparent directories
//! 3. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexdesk_domain::{
    ApiConfig, Config, IdentityCacheConfig, IndexDeskError, LoggingConfig, Result,
};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["indexdesk.json", "indexdesk.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `IndexDeskError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - A value cannot be parsed
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only the base URL is required; every other variable falls back to its
/// default when unset.
///
/// # Errors
/// Returns `IndexDeskError::Config` if the base URL is missing or a value
/// does not parse.
pub fn load_from_env() -> Result<Config> {
    let defaults = Config::default();

    let api = ApiConfig {
        base_url: env_var("INDEXDESK_API_BASE_URL")?,
        timeout_ms: env_parse("INDEXDESK_API_TIMEOUT_MS", defaults.api.timeout_ms)?,
        max_retries: env_parse("INDEXDESK_API_MAX_RETRIES", defaults.api.max_retries)?,
        retry_base_delay_ms: env_parse(
            "INDEXDESK_API_RETRY_BASE_DELAY_MS",
            defaults.api.retry_base_delay_ms,
        )?,
        logging: std::env::var("INDEXDESK_API_LOGGING").ok().map(|raw| parse_bool(&raw)),
    };

    let identity = IdentityCacheConfig {
        ttl_ms: env_parse("INDEXDESK_IDENTITY_TTL_MS", defaults.identity.ttl_ms)?,
    };

    let logging = LoggingConfig {
        level: std::env::var("INDEXDESK_LOG_LEVEL").unwrap_or(defaults.logging.level),
        json: env_bool("INDEXDESK_LOG_JSON", defaults.logging.json),
    };

    Ok(Config { api, identity, logging })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `IndexDeskError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(IndexDeskError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            IndexDeskError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| IndexDeskError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration, detecting the format from the extension
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| IndexDeskError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| IndexDeskError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(IndexDeskError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend(cwd.ancestors().take(3).map(Path::to_path_buf));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| IndexDeskError::Config(format!("Missing required environment variable: {key}")))
}

/// Parse an optional numeric variable, falling back to `default` when unset
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| IndexDeskError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key).ok().map(|raw| parse_bool(&raw)).unwrap_or(default)
}
