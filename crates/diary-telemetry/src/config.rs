//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to log lines
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "ledger-diary".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DIARY_SERVICE_NAME`: Service name (default: ledger-diary)
    /// - `DIARY_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `DIARY_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `DIARY_JSON_LOGS`: Enable JSON logs (default: false, true in containers)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Same as `from_env` with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let is_container =
            lookup("KUBERNETES_SERVICE_HOST").is_some() || lookup("DOCKER_CONTAINER").is_some();

        Self {
            service_name: lookup("DIARY_SERVICE_NAME")
                .unwrap_or_else(|| "ledger-diary".to_string()),

            log_level: lookup("DIARY_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or_else(|| "info".to_string()),

            console_output: lookup("DIARY_CONSOLE_OUTPUT")
                .map_or(true, |v| v.to_lowercase() != "false" && v != "0"),

            json_logs: lookup("DIARY_JSON_LOGS")
                .map_or(is_container, |v| v.to_lowercase() == "true" || v == "1"),
        }
    }
}
