//! Prober without the dashboard. Refuses to start when no targets are set.

use anyhow::{Context, Result};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

use keepwarm::{telemetry, MonitorConfig, Prober, StatusStore, Variant};

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();

    let config = MonitorConfig::from_env(Variant::Standalone).context("Invalid configuration")?;
    info!("Keep-warm loop starting, monitoring {} URLs", config.urls.len());
    for url in &config.urls {
        info!("  -> {}", url);
    }

    let store = StatusStore::new(config.urls.iter().cloned());
    let token = CancellationToken::new();
    let prober = Prober::new(config, store)?.spawn(token.clone());

    signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown signal received. Stopping keep-warm loop...");
    token.cancel();
    prober.await.context("Prober task panicked")?;

    Ok(())
}
