pub mod prepump;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use solana_pubkey::Pubkey;
use tokio::time::Instant;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::config::WatcherConfig;
use crate::handler::telegram::Notification;
use crate::handler::telegram::Notify;
use crate::model::TokenCreationEvent;
use crate::model::WatcherStatus;
use crate::rpc::ChainRpc;
use crate::utils::is_rate_limit_error;
use crate::watcher::prepump::PendingMints;

/// Result of one poll tick, mostly for logs and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Cooldown still active; no upstream call was made.
    CoolingDown { remaining: Duration },
    Completed {
        new_signatures: usize,
        events: Vec<TokenCreationEvent>,
    },
    /// Upstream failed; the loop keeps ticking.
    Failed { rate_limited: bool },
}

/// Owns every piece of mutable watch state: the seen-signature set, the
/// rate-limit cooldown and the error-notification window. Constructed per
/// wallet, driven by `tick()`.
pub struct Watcher {
    target: Pubkey,
    signature_limit: usize,
    cooldown_window: Duration,
    error_notify_window: Duration,
    rpc: Arc<dyn ChainRpc>,
    notifier: Arc<dyn Notify>,
    pending: Option<PendingMints>,
    // Grows without eviction; acceptable for one wallet over a process
    // lifetime. Kept private so a bounded set can replace it later.
    seen: HashSet<String>,
    cooldown_until: Option<Instant>,
    last_error_notified: Option<Instant>,
    started_at: Instant,
}

impl Watcher {
    pub fn new(
        config: &WatcherConfig,
        target: Pubkey,
        rpc: Arc<dyn ChainRpc>,
        notifier: Arc<dyn Notify>,
        pending: Option<PendingMints>,
    ) -> Self {
        Self {
            target,
            signature_limit: config.signature_limit,
            cooldown_window: Duration::from_secs(config.cooldown_secs),
            error_notify_window: Duration::from_secs(config.error_notify_secs),
            rpc,
            notifier,
            pending,
            seen: HashSet::new(),
            cooldown_until: None,
            last_error_notified: None,
            started_at: Instant::now(),
        }
    }

    pub fn status(&self) -> WatcherStatus {
        WatcherStatus {
            online: true,
            uptime_secs: self.started_at.elapsed().as_secs(),
            wallet: self.target.to_string(),
        }
    }

    pub async fn tick(&mut self) -> TickOutcome {
        let now = Instant::now();
        if let Some(resume_at) = self.cooldown_until {
            if now < resume_at {
                let remaining = resume_at - now;
                debug!("cooldown_active::remaining_secs::{}", remaining.as_secs());
                return TickOutcome::CoolingDown { remaining };
            }
            info!("cooldown_expired::resuming_polls");
            self.cooldown_until = None;
        }

        match self.poll_once().await {
            Ok(outcome) => outcome,
            Err(e) => self.handle_failure(e).await,
        }
    }

    async fn poll_once(&mut self) -> crate::Result<TickOutcome> {
        let signatures = self.rpc.recent_signatures(&self.target, self.signature_limit).await?;

        let mut new_signatures = 0;
        let mut events = Vec::new();

        for signature in signatures {
            if self.seen.contains(&signature) {
                continue;
            }

            // Marked seen before processing: a failure past this point drops
            // the event instead of re-notifying on the next tick.
            self.seen.insert(signature.clone());
            new_signatures += 1;

            let Some(instructions) = self.rpc.parsed_transaction(&signature).await? else {
                // Not visible yet. It stays seen and is never retried.
                warn!("transaction_not_available::signature::{}", signature);
                continue;
            };

            for instruction in &instructions {
                if let Some(event) = instruction.token_creation() {
                    info!("token_created::mint::{}::signature::{}", event.mint, signature);

                    if let Some(pending) = &self.pending {
                        pending.insert(event.mint.clone()).await;
                    }

                    self.emit(Notification::TokenCreated { mint: event.mint.clone() }).await;
                    events.push(event);
                }
            }
        }

        Ok(TickOutcome::Completed { new_signatures, events })
    }

    async fn handle_failure(&mut self, error: crate::Error) -> TickOutcome {
        let message = format!("{error:#}");

        if is_rate_limit_error(&message) {
            warn!("rpc_rate_limited::entering_cooldown::{}", message);
            self.cooldown_until = Some(Instant::now() + self.cooldown_window);
            // Announced once per episode, not on every suppressed tick.
            self.emit(Notification::RateLimited {
                resume_secs: self.cooldown_window.as_secs(),
            })
            .await;
            return TickOutcome::Failed { rate_limited: true };
        }

        error!("watcher_tick_failed::{}", message);

        let now = Instant::now();
        let should_notify = self
            .last_error_notified
            .is_none_or(|at| now.duration_since(at) >= self.error_notify_window);
        if should_notify {
            self.last_error_notified = Some(now);
            self.emit(Notification::Error { text: message }).await;
        }

        TickOutcome::Failed { rate_limited: false }
    }

    async fn emit(&self, notification: Notification) {
        if let Err(e) = self.notifier.notify(notification).await {
            error!("notification_send_failed::{}", e);
        }
    }
}
