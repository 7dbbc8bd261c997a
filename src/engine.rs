use anyhow::{Context, Result};
use chrono::Utc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::MonitorConfig;
use crate::models::{ProbeErrorKind, ProbeOutcome, StatusClass, StatusRecord};
use crate::store::StatusStore;

/// Issues keep-warm GETs against every configured target, one after another,
/// and records what it saw in the [`StatusStore`].
pub struct Prober {
    config: MonitorConfig,
    store: StatusStore,
    http_client: reqwest::Client,
}

impl Prober {
    pub fn new(config: MonitorConfig, store: StatusStore) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("keepwarm/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            store,
            http_client,
        })
    }

    /// Runs the loop on the current runtime until `token` is cancelled.
    pub fn spawn(self, token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(token).await })
    }

    pub async fn run(&self, token: CancellationToken) {
        info!(
            targets = self.config.urls.len(),
            interval_secs = self.config.ping_interval_secs,
            timeout_secs = self.config.request_timeout_secs,
            "Keep-warm prober started"
        );

        loop {
            let start = Instant::now();
            let Some(probed) = self.cycle(&token).await else {
                break;
            };
            info!(
                "Cycle completed {} probes in {:.2}s.",
                probed,
                start.elapsed().as_secs_f64()
            );

            if !pause(&token, self.config.ping_interval()).await {
                break;
            }
        }

        info!("Keep-warm prober stopped");
    }

    /// One full pass over the targets. Returns how many were probed.
    pub async fn run_cycle(&self) -> usize {
        self.cycle(&CancellationToken::new()).await.unwrap_or(0)
    }

    /// `None` once `token` fires; the target in flight is not recorded.
    async fn cycle(&self, token: &CancellationToken) -> Option<usize> {
        let mut probed = 0;
        for url in &self.config.urls {
            let outcome = tokio::select! {
                outcome = self.probe(url) => outcome,
                _ = token.cancelled() => return None,
            };
            self.record(url, outcome).await;
            probed += 1;

            if !pause(token, self.config.target_spacing()).await {
                return None;
            }
        }
        Some(probed)
    }

    /// A single GET. Any response counts as a status, whatever its code.
    pub async fn probe(&self, url: &str) -> ProbeOutcome {
        match self.http_client.get(url).send().await {
            Ok(response) => ProbeOutcome::Status(response.status().as_u16()),
            Err(e) => {
                debug!(url, error = %e, "Probe request failed");
                ProbeOutcome::Error(ProbeErrorKind::classify(&e))
            }
        }
    }

    async fn record(&self, url: &str, outcome: ProbeOutcome) {
        let record = StatusRecord::from_outcome(&outcome, Utc::now());
        let new_status = record.status.clone();
        let previous = self.store.set(url, record).await;

        let class = StatusClass::of(&new_status);
        let old_status = match previous {
            Some(old) if !old.is_pending() && old.status == new_status => {
                debug!(url, status = %new_status, "Unchanged");
                return;
            }
            Some(old) if !old.is_pending() => old.status,
            _ if class != StatusClass::Error => {
                info!(url, status = %new_status, "First check");
                return;
            }
            _ => "-".to_string(),
        };

        let msg = format!("[CHANGE] {} : {} -> {}", url, old_status, new_status);
        if class == StatusClass::Error { error!("{}", msg); } else { warn!("{}", msg); }
    }
}

/// Sleeps for `duration` unless cancelled first. Returns false on cancellation.
async fn pause(token: &CancellationToken, duration: Duration) -> bool {
    if token.is_cancelled() {
        return false;
    }
    if duration.is_zero() {
        return true;
    }
    tokio::select! {
        _ = tokio::time::sleep(duration) => true,
        _ = token.cancelled() => false,
    }
}
