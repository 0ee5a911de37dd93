//! # Diary Telemetry
//!
//! Logging and metrics for the ledger diary.
//!
//! ## Components
//!
//! - **Logs**: `tracing-subscriber` with `EnvFilter`, plain or JSON
//! - **Metrics**: Prometheus counters and histograms in a global registry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use diary_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(&TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DIARY_SERVICE_NAME` | `ledger-diary` | Service name in logs |
//! | `DIARY_LOG_LEVEL` | `info` | Log level filter (`RUST_LOG` also honored) |
//! | `DIARY_JSON_LOGS` | `false` | JSON log lines |
//! | `DIARY_CONSOLE_OUTPUT` | `true` | Install the console subscriber |

#![warn(missing_docs)]

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging};
pub use metrics::{
    encode_metrics, record_bytes_written, record_operation, register_metrics, MetricsHandle,
    DIARY_OPERATIONS, OPERATION_DURATION, RECORD_BYTES_WRITTEN, REGISTRY,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// Metrics could not be registered or encoded.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// Configuration is unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that must be held for the lifetime of the application.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    // Metrics first, so nothing recorded during startup is lost.
    let metrics = register_metrics()?;
    logging::init_logging(config)?;

    tracing::info!(service = %config.service_name, "Telemetry initialized");
    Ok(TelemetryGuard { metrics })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    metrics: MetricsHandle,
}

impl TelemetryGuard {
    /// Metrics handle for exposition.
    #[must_use]
    pub fn metrics(&self) -> MetricsHandle {
        self.metrics
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}
