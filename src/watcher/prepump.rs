//! Pre-pump tracking: mints already seen on-chain whose pump.fun page has
//! not shown up yet. A secondary timer probes the page and announces each
//! mint exactly once when it goes live.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::debug;
use tracing::error;
use tracing::info;

use crate::config::PrepumpConfig;
use crate::handler::shutdown::ShutdownSignal;
use crate::handler::telegram::Notification;
use crate::handler::telegram::Notify;
use crate::Result;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default)]
pub struct PendingMints {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl PendingMints {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, mint: String) {
        self.inner.lock().await.insert(mint);
    }

    /// Returns true when the mint was still pending.
    pub async fn remove(&self, mint: &str) -> bool {
        self.inner.lock().await.remove(mint)
    }

    pub async fn snapshot(&self) -> Vec<String> {
        self.inner.lock().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

pub struct PrepumpChecker {
    config: PrepumpConfig,
    pending: PendingMints,
    notifier: Arc<dyn Notify>,
    shutdown: ShutdownSignal,
    http_client: Client,
}

impl PrepumpChecker {
    pub fn new(
        config: PrepumpConfig,
        pending: PendingMints,
        notifier: Arc<dyn Notify>,
        shutdown: ShutdownSignal,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .map_err(|e| crate::err_with_loc!(format!("prepump http client: {e}")))?;

        Ok(Self {
            config,
            pending,
            notifier,
            shutdown,
            http_client,
        })
    }

    pub async fn run(self) {
        info!("prepump_checker_started::interval_secs::{}", self.config.check_interval_secs);

        let mut interval = tokio::time::interval(Duration::from_secs(self.config.check_interval_secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.wait_for_shutdown() => {
                    info!("prepump_checker::shutdown");
                    break;
                },
                _ = interval.tick() => {
                    self.check_pending().await;
                }
            }
        }
    }

    pub async fn check_pending(&self) {
        for mint in self.pending.snapshot().await {
            match self.probe(&mint).await {
                Ok(true) => {
                    // remove() guards against a concurrent pass announcing twice
                    if self.pending.remove(&mint).await {
                        info!("token_live::mint::{}", mint);
                        if let Err(e) = self.notifier.notify(Notification::TokenLive { mint: mint.clone() }).await {
                            error!("live_notification_failed::{}", e);
                        }
                    }
                },
                Ok(false) => debug!("page_not_live_yet::mint::{}", mint),
                Err(e) => debug!("page_probe_failed::mint::{}::{}", mint, e),
            }
        }
    }

    async fn probe(&self, mint: &str) -> Result<bool> {
        let url = format!("{}/{}", self.config.base_url, mint);
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| crate::err_with_loc!(format!("probe {url}: {e}")))?;
        Ok(response.status().is_success())
    }
}
