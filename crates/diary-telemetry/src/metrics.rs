//! Prometheus metrics for the diary program.
//!
//! All metrics follow the naming convention: `diary_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, HistogramOpts, HistogramVec, Opts,
    Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Instructions executed, by operation and outcome
    pub static ref DIARY_OPERATIONS: CounterVec = CounterVec::new(
        Opts::new("diary_operations_total", "Diary instructions executed"),
        &["operation", "outcome"]  // outcome: ok or an error kind
    ).expect("metric creation failed");

    /// Encoded record bytes written
    pub static ref RECORD_BYTES_WRITTEN: Counter = Counter::new(
        "diary_records_bytes_written_total",
        "Encoded record bytes written by add_record and write_record"
    ).expect("metric creation failed");

    /// Transaction duration, by operation
    pub static ref OPERATION_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "diary_operation_duration_seconds",
            "Time from lock acquisition to commit"
        ).buckets(exponential_buckets(0.00005, 2.0, 16).expect("valid buckets")),
        &["operation"]
    ).expect("metric creation failed");
}

/// Handle to the registered metrics.
#[derive(Debug, Clone, Copy)]
pub struct MetricsHandle {
    _private: (),
}

impl MetricsHandle {
    /// Encode all metrics as Prometheus text format.
    pub fn gather(&self) -> Result<String, TelemetryError> {
        encode_metrics()
    }
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(DIARY_OPERATIONS.clone()),
        Box::new(RECORD_BYTES_WRITTEN.clone()),
        Box::new(OPERATION_DURATION.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle { _private: () })
}

/// Records one executed instruction.
pub fn record_operation(operation: &str, outcome: &str, seconds: f64) {
    DIARY_OPERATIONS
        .with_label_values(&[operation, outcome])
        .inc();
    OPERATION_DURATION
        .with_label_values(&[operation])
        .observe(seconds);
}

/// Adds to the written-bytes counter.
pub fn record_bytes_written(bytes: u64) {
    RECORD_BYTES_WRITTEN.inc_by(bytes as f64);
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
