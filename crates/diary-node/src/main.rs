//! # Diary Node
//!
//! Entry point: initializes telemetry, loads configuration from the
//! environment and replays the diary scenario against an in-memory ledger.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging and metrics
//! 2. Load and validate configuration
//! 3. Bootstrap the service and fund the authority
//! 4. Run create_diary, add_record, remove_record
//! 5. Print the report and the Prometheus metrics

use anyhow::{Context, Result};
use diary_node::{DiaryNode, NodeConfig};
use diary_telemetry::{init_telemetry, TelemetryConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = init_telemetry(&TelemetryConfig::from_env())?;

    let config = NodeConfig::from_env().context("Failed to load node configuration")?;

    info!("===========================================");
    info!("  Ledger Diary Node v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let node = DiaryNode::bootstrap(config)?;
    let report = match node.run_scenario().await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Scenario failed");
            return Err(e);
        }
    };

    let stats = node.service().stats().await;
    info!(
        diary = %report.diary,
        record = %report.record,
        transactions = stats.transactions_processed,
        avg_execution_time_us = stats.avg_execution_time_us,
        final_balance = report.final_balance,
        "Scenario complete"
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    println!("{}", telemetry.metrics().gather()?);

    Ok(())
}
