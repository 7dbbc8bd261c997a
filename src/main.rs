use anyhow::{Context, Result};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

use keepwarm::{api, telemetry, MonitorConfig, Prober, StatusStore, Variant};

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();
    info!("Keep-warm watcher (web UI) v{} starting", env!("CARGO_PKG_VERSION"));

    let config = MonitorConfig::from_env(Variant::Dashboard).context("Invalid configuration")?;
    let store = StatusStore::new(config.urls.iter().cloned());
    let api_port = config.api_port;

    let token = CancellationToken::new();
    let prober = Prober::new(config, store.clone())?.spawn(token.clone());
    let mut server = tokio::spawn(api::start_server(api_port, store, token.clone()));

    // The server only returns early when it failed to start or crashed.
    let early_exit = tokio::select! {
        res = signal::ctrl_c() => {
            if let Err(e) = res {
                token.cancel();
                return Err(e).context("Failed to listen for shutdown signal");
            }
            info!("Shutdown signal received. Stopping keep-warm watcher...");
            None
        }
        res = &mut server => Some(res),
    };
    token.cancel();

    prober.await.context("Prober task panicked")?;
    let server_result = match early_exit {
        Some(res) => res,
        None => server.await,
    };
    server_result.context("Dashboard task panicked")?
}
