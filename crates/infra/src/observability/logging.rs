//! Tracing subscriber initialization
//!
//! Structured logging with `tracing-subscriber`, compact for terminals and
//! JSON for log shippers. `RUST_LOG` overrides the configured level.

use indexdesk_domain::{IndexDeskError, LoggingConfig, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter from `RUST_LOG`, else from `level`, else `info`
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber
///
/// # Errors
/// Returns `IndexDeskError::Internal` if a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let registry = tracing_subscriber::registry().with(build_filter(&config.level));

    let installed = if config.json {
        registry
            .with(fmt::layer().json().with_current_span(true).with_target(true))
            .try_init()
    } else {
        registry.with(fmt::layer().compact().with_target(true)).try_init()
    };

    installed.map_err(|err| IndexDeskError::Internal(format!("failed to install logger: {err}")))?;

    tracing::info!(level = %config.level, json = config.json, "Logging initialized");
    Ok(())
}
