use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::Mutex;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::api::TgResponse;
use super::api::TgUpdate;
use super::Notification;
use super::Notify;
use crate::config::TelegramConfig;
use crate::err_with_loc;
use crate::error::handler::HandlerError;
use crate::handler::shutdown::ShutdownSignal;
use crate::utils::calculate_backoff_with_jitter;
use crate::watcher::Watcher;
use crate::Result;

pub const STATUS_COMMAND: &str = "/status";

const POLL_RETRY_BASE_DELAY_MS: u64 = 500;
const POLL_RETRY_MAX_DELAY_MS: u64 = 30_000;

/// Routes one inbound update. Shared by the long-poll loop and the webhook
/// endpoint so both transports behave identically.
pub async fn dispatch_update(
    update: &TgUpdate,
    telegram_config: &TelegramConfig,
    watcher: &Arc<Mutex<Watcher>>,
    notifier: &Arc<dyn Notify>,
) {
    let Some(message) = &update.message else { return };
    let Some(text) = &message.text else { return };

    if !text.trim().starts_with(STATUS_COMMAND) {
        return;
    }

    // Only the configured chat may query the bot; anything else is ignored
    // without a reply.
    if message.chat.id.to_string() != telegram_config.chat_id {
        debug!("status_from_unknown_chat::{}", message.chat.id);
        return;
    }

    let status = watcher.lock().await.status();
    if let Err(e) = notifier.notify(Notification::Status(status)).await {
        error!("status_reply_failed::{}", e);
    }
}

/// getUpdates long-poll loop, the default update transport.
pub struct CommandListener {
    telegram_config: Arc<TelegramConfig>,
    watcher: Arc<Mutex<Watcher>>,
    notifier: Arc<dyn Notify>,
    shutdown: ShutdownSignal,
    http_client: Client,
    offset: i64,
}

impl CommandListener {
    pub fn new(
        telegram_config: Arc<TelegramConfig>,
        watcher: Arc<Mutex<Watcher>>,
        notifier: Arc<dyn Notify>,
        shutdown: ShutdownSignal,
    ) -> Result<Self> {
        // Client timeout must outlive the server-side long-poll window.
        let http_client = Client::builder()
            .timeout(Duration::from_secs(telegram_config.poll_timeout_secs + 10))
            .build()
            .map_err(|e| err_with_loc!(HandlerError::PollUpdatesError(e.to_string())))?;

        Ok(Self {
            telegram_config,
            watcher,
            notifier,
            shutdown,
            http_client,
            offset: 0,
        })
    }

    pub async fn run(mut self) {
        info!("command_listener_started");

        let shutdown = self.shutdown.clone();
        let mut attempt = 0usize;

        loop {
            tokio::select! {
                _ = shutdown.wait_for_shutdown() => {
                    info!("command_listener::shutdown");
                    break;
                },
                result = self.poll_once() => {
                    match result {
                        Ok(()) => {
                            attempt = 0;
                        },
                        Err(e) => {
                            warn!("get_updates_failed::{}", e);
                            let delay = calculate_backoff_with_jitter(
                                attempt,
                                POLL_RETRY_BASE_DELAY_MS,
                                POLL_RETRY_MAX_DELAY_MS,
                            );
                            attempt += 1;
                            // The backoff must not delay shutdown.
                            tokio::select! {
                                _ = shutdown.wait_for_shutdown() => {
                                    info!("command_listener::shutdown");
                                    break;
                                },
                                _ = tokio::time::sleep(delay) => {},
                            }
                        },
                    }
                }
            }
        }
    }

    async fn poll_once(&mut self) -> Result<()> {
        let url = self.telegram_config.method_url("getUpdates");

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("timeout", self.telegram_config.poll_timeout_secs.to_string()),
                ("offset", self.offset.to_string()),
            ])
            .send()
            .await
            .map_err(|e| err_with_loc!(HandlerError::PollUpdatesError(e.to_string())))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(err_with_loc!(HandlerError::PollUpdatesError(format!(
                "getUpdates returned {status}"
            ))));
        }

        let body: TgResponse<Vec<TgUpdate>> = response
            .json()
            .await
            .map_err(|e| err_with_loc!(HandlerError::PollUpdatesError(e.to_string())))?;

        if !body.ok {
            return Err(err_with_loc!(HandlerError::PollUpdatesError(
                "getUpdates returned ok=false".to_string()
            )));
        }

        for update in body.result.unwrap_or_default() {
            self.offset = self.offset.max(update.update_id + 1);
            dispatch_update(&update, &self.telegram_config, &self.watcher, &self.notifier).await;
        }

        Ok(())
    }
}
