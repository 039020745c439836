//! Structured logging setup
//!
//! The engine itself only emits `tracing` events and spans: invocations at
//! `debug`, registration conflicts at `warn`, caught panics at `error`, and raw
//! payloads at `trace`. Nothing is printed unless the host installs a
//! subscriber. [`init_logging`] installs a `tracing-subscriber` pipeline for
//! hosts that do not have their own.
//!
//! # Usage Pattern
//!
//! ```rust,no_run
//! use jrpc_core::LoggingConfig;
//!
//! let config = LoggingConfig::new("calculator")
//!     .with_log_level("debug")
//!     .with_json(true);
//!
//! jrpc_core::init_logging(config).expect("Failed to init logging");
//! ```
//!
//! # Filtering
//!
//! `RUST_LOG` takes precedence over the configured level, so
//! `RUST_LOG=jrpc_server=trace` works without code changes.

use crate::error::{Error, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration
///
/// # Examples
///
/// ```rust
/// use jrpc_core::LoggingConfig;
///
/// let config = LoggingConfig::new("my-service")
///     .with_log_level("warn")
///     .with_ansi(false);
///
/// assert_eq!(config.service_name, "my-service");
/// assert_eq!(config.log_level, "warn");
/// ```
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Recorded on the root span of the host
    pub service_name: String,
    /// Filter directive used when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit one JSON object per event instead of plain lines
    pub json: bool,
    /// Colorize plain output
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            service_name: "jrpc".to_string(),
            log_level: "info".to_string(),
            json: false,
            ansi: true,
        }
    }
}

impl LoggingConfig {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }
}

/// Install a global `tracing` subscriber
///
/// The pipeline is a registry with an [`EnvFilter`] and a `fmt` layer.
///
/// # Errors
///
/// Returns `Error::Config` if the filter directive is malformed or a global
/// subscriber is already installed.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| Error::Config(format!("invalid log filter: {}", e)))?;

    let installed = if config.json {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_ansi(config.ansi)
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
    };

    installed.map_err(|e| Error::Config(format!("failed to install subscriber: {}", e)))?;

    tracing::info!(service = %config.service_name, "logging initialized");
    Ok(())
}
