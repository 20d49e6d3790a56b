//! Escalation monitor binary entrypoint.

use std::time::Duration;

use tracing_subscriber::EnvFilter;

use escalation_common::config::AppConfig;
use escalation_engine::clock::SystemClock;
use escalation_engine::{EscalationMonitor, MonitorSettings};
use escalation_monitor::poller::MonitorLoop;
use escalation_slack::SlackApiClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(
                "escalation_monitor=info,escalation_engine=info,escalation_notifier=info,escalation_slack=info",
            )
        }))
        .json()
        .init();

    tracing::info!("Escalation monitor starting...");

    let result = run().await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Fatal error");
    }

    tracing::info!("Exiting...");
    result
}

async fn run() -> anyhow::Result<()> {
    // Load configuration
    let config = AppConfig::from_env()?;

    let client = SlackApiClient::from_config(&config)?;
    let monitor = EscalationMonitor::new(MonitorSettings::from_config(&config));

    let mut poller = MonitorLoop::new(
        client,
        SystemClock,
        monitor,
        Duration::from_secs(config.poll_interval_secs),
        Duration::from_secs(config.fault_backoff_secs),
    );

    // Run until Ctrl+C
    tokio::select! {
        result = poller.run() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Monitoring stopped by user");
        }
    }

    Ok(())
}
