use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;
use tracing::error;
use tracing::info;

use crate::config::load_config;
use crate::config::Config;
use crate::config::DeliveryMode;
use crate::err_with_loc;
use crate::error::Result;
use crate::handler::shutdown::ShutdownSignal;
use crate::handler::telegram::commands::CommandListener;
use crate::handler::telegram::sender::TelegramNotifier;
use crate::handler::telegram::webhook::run_webhook_server;
use crate::handler::telegram::webhook::WebhookState;
use crate::handler::telegram::Notification;
use crate::handler::telegram::Notify;
use crate::rpc::parse_wallet;
use crate::rpc::ChainRpc;
use crate::rpc::SolanaRpc;
use crate::setup_tracing;
use crate::watcher::prepump::PendingMints;
use crate::watcher::prepump::PrepumpChecker;
use crate::watcher::Watcher;

/// Top-level orchestrator: wires config, chain access, the notifier and the
/// timers together, then parks until ctrl-c or a fatal transport error.
pub struct Mintwatch {
    pub config: Config,
    pub shutdown: ShutdownSignal,
    pub notifier: Arc<dyn Notify>,
    pub watcher: Arc<Mutex<Watcher>>,
    pub pending: Option<PendingMints>,
}

impl Mintwatch {
    pub async fn run(config_path: impl AsRef<Path>) -> Result<()> {
        let config = load_config(config_path)?;
        setup_tracing("mintwatch", &config.logging);
        info!("starting_mintwatch::wallet::{}", config.watcher.wallet);

        let shutdown = ShutdownSignal::new();
        let telegram_config = Arc::new(config.telegram.clone());
        let notifier: Arc<dyn Notify> = Arc::new(TelegramNotifier::new(telegram_config.clone()));
        let rpc: Arc<dyn ChainRpc> = Arc::new(SolanaRpc::new(&config.rpc));
        let wallet = parse_wallet(&config.watcher.wallet)?;

        let pending = config.watcher.prepump.enabled.then(PendingMints::new);
        let watcher = Arc::new(Mutex::new(Watcher::new(
            &config.watcher,
            wallet,
            rpc,
            notifier.clone(),
            pending.clone(),
        )));

        let mintwatch = Mintwatch {
            config,
            shutdown,
            notifier,
            watcher,
            pending,
        };

        mintwatch.spawn_startup_announcement();
        mintwatch.spawn_heartbeat();
        mintwatch.spawn_watch_loop();
        mintwatch.spawn_prepump_checker()?;

        let transport = mintwatch.spawn_update_transport()?;

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("ctrl_c_received::shutting_down");
            },
            result = transport => {
                mintwatch.shutdown.shutdown();
                match result {
                    Ok(Ok(())) => info!("update_transport_finished"),
                    Ok(Err(e)) => return Err(e),
                    Err(e) => return Err(err_with_loc!(format!("update transport panicked: {e}"))),
                }
            }
        }

        mintwatch.shutdown.shutdown();
        Ok(())
    }

    fn spawn_startup_announcement(&self) {
        let notifier = self.notifier.clone();
        let wallet = self.config.watcher.wallet.clone();
        let delay = Duration::from_secs(self.config.watcher.startup_delay_secs);

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = notifier.notify(Notification::Online { wallet }).await {
                error!("online_announcement_failed::{}", e);
            }
        });
    }

    fn spawn_heartbeat(&self) {
        let notifier = self.notifier.clone();
        let shutdown = self.shutdown.clone();
        let period = Duration::from_secs(self.config.watcher.heartbeat_secs);

        tokio::spawn(async move {
            // First beat one full period after start, not immediately.
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = shutdown.wait_for_shutdown() => {
                        info!("heartbeat::shutdown");
                        break;
                    },
                    _ = interval.tick() => {
                        if let Err(e) = notifier.notify(Notification::Heartbeat).await {
                            error!("heartbeat_failed::{}", e);
                        }
                    }
                }
            }
        });
    }

    fn spawn_watch_loop(&self) {
        let watcher = self.watcher.clone();
        let shutdown = self.shutdown.clone();
        let period = Duration::from_secs(self.config.watcher.poll_interval_secs);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // Ticks never overlap: the next one waits for the previous to
            // finish instead of stacking up.
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown.wait_for_shutdown() => {
                        info!("watch_loop::shutdown");
                        break;
                    },
                    _ = interval.tick() => {
                        let outcome = watcher.lock().await.tick().await;
                        debug!("tick_outcome::{:?}", outcome);
                    }
                }
            }
        });
    }

    fn spawn_prepump_checker(&self) -> Result<()> {
        let Some(pending) = self.pending.clone() else {
            return Ok(());
        };

        let checker = PrepumpChecker::new(
            self.config.watcher.prepump.clone(),
            pending,
            self.notifier.clone(),
            self.shutdown.clone(),
        )?;
        tokio::spawn(checker.run());
        Ok(())
    }

    fn spawn_update_transport(&self) -> Result<JoinHandle<Result<()>>> {
        let telegram_config = Arc::new(self.config.telegram.clone());

        match self.config.telegram.delivery {
            DeliveryMode::LongPolling => {
                let listener = CommandListener::new(
                    telegram_config,
                    self.watcher.clone(),
                    self.notifier.clone(),
                    self.shutdown.clone(),
                )?;
                Ok(tokio::spawn(async move {
                    listener.run().await;
                    Ok(())
                }))
            },
            DeliveryMode::Webhook => {
                let state = WebhookState {
                    telegram_config,
                    watcher: self.watcher.clone(),
                    notifier: self.notifier.clone(),
                };
                let bind = self.config.telegram.webhook_bind.clone();
                let shutdown = self.shutdown.clone();
                Ok(tokio::spawn(async move { run_webhook_server(state, &bind, shutdown).await }))
            },
        }
    }
}
