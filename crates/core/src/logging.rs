//! Structured logging infrastructure for Motorpool.
//!
//! This module provides centralized logging initialization with support
//! for structured JSON output and environment-based configuration.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};

/// Initialize the logging system with structured output.
///
/// Log level can be configured via the `RUST_LOG` environment variable.
/// If not set, defaults to `info` level.
///
/// # Example
/// ```no_run
/// use motorpool_core::logging;
///
/// logging::init();
/// tracing::info!("Application started");
/// ```
pub fn init() {
    init_with("info", LogFormat::Pretty);
}

/// Initialize the logging system with JSON output for production environments.
///
/// # Example
/// ```no_run
/// use motorpool_core::logging;
///
/// logging::init_json();
/// tracing::info!(resource = "cars", "Store ready");
/// ```
pub fn init_json() {
    init_with("info", LogFormat::Json);
}

/// Initialize from the `[logging]` config section. `RUST_LOG` still wins.
pub fn init_from_config(config: &LoggingConfig) {
    init_with(&config.level, config.format);
}

fn init_with(default_level: &str, format: LogFormat) {
    let filter = build_filter(default_level);

    // Repeated initialization (tests, embedding) is not an error.
    let result = match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true))
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("Logging already initialized");
    }
}

fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
