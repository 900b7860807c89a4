use std::sync::Arc;

use reqwest::Client;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::error;

use super::Notification;
use super::Notify;
use crate::config::TelegramConfig;
use crate::err_with_loc;
use crate::error::handler::HandlerError;
use crate::Result;

/// Telegram caps a message at 4096 characters; stay under it.
const MESSAGE_CHUNK_BYTES: usize = 4000;

struct TelegramSender {
    receiver: mpsc::Receiver<Notification>,
    telegram_config: Arc<TelegramConfig>,
    http_client: Client,
}

impl TelegramSender {
    fn new(receiver: mpsc::Receiver<Notification>, telegram_config: Arc<TelegramConfig>) -> Self {
        Self {
            receiver,
            telegram_config,
            http_client: Client::new(),
        }
    }

    async fn send_message(&self, text: &str) -> Result<()> {
        send_to_chat(&self.http_client, &self.telegram_config, text).await
    }
}

async fn send_to_chat(http_client: &Client, telegram_config: &TelegramConfig, text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(err_with_loc!("Empty message"));
    }

    for chunk in split_chunks(text) {
        let payload = json!({
            "chat_id": telegram_config.chat_id,
            "text": chunk,
        });

        let url = telegram_config.method_url("sendMessage");

        match http_client.post(&url).json(&payload).send().await {
            Ok(response) => {
                if !response.status().is_success() {
                    let status = response.status();
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "<failed to read response text>".to_string());
                    return Err(err_with_loc!(HandlerError::SendTelegramError(format!(
                        "sendMessage returned {status}: {body}"
                    ))));
                }
            },
            Err(e) => {
                return Err(err_with_loc!(HandlerError::SendTelegramError(e.to_string())));
            },
        }
    }

    Ok(())
}

/// Splits on char boundaries so a multi-byte character never straddles two
/// messages.
fn split_chunks(text: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.len() > MESSAGE_CHUNK_BYTES {
        let mut end = MESSAGE_CHUNK_BYTES;
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        let (head, tail) = rest.split_at(end);
        chunks.push(head);
        rest = tail;
    }

    chunks.push(rest);
    chunks
}

async fn run_telegram_sender(mut telegram_sender: TelegramSender) {
    loop {
        tokio::select! {
            Some(notification) = telegram_sender.receiver.recv() => {
                // Delivery failures are logged and dropped, never retried.
                if let Err(e) = telegram_sender.send_message(&notification.render()).await {
                    error!("telegram_send_failed::{}", e);
                }
            },
            else => {
                break;
            }
        }
    }
}

/// Queue-backed handle to the sender actor. Cloneable, cheap, and its
/// `notify` never fails the caller.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    sender: mpsc::Sender<Notification>,
}

impl TelegramNotifier {
    pub fn new(telegram_config: Arc<TelegramConfig>) -> Self {
        let (sender, receiver) = mpsc::channel(100);

        let telegram_sender = TelegramSender::new(receiver, telegram_config);
        tokio::spawn(run_telegram_sender(telegram_sender));

        Self { sender }
    }

    /// One-shot delivery that waits for the HTTP round-trip. Used for the
    /// final crash alert where the actor queue would be torn down too early.
    pub async fn send_now(telegram_config: &TelegramConfig, notification: Notification) -> Result<()> {
        send_to_chat(&Client::new(), telegram_config, &notification.render()).await
    }
}

#[async_trait::async_trait]
impl Notify for TelegramNotifier {
    async fn notify(&self, notification: Notification) -> Result<()> {
        if let Err(e) = self.sender.try_send(notification) {
            error!("telegram_queue_unavailable::{}", e);
        }
        Ok(())
    }
}
