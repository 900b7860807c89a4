use serde::Deserialize;
use serde::Serialize;

use crate::constants::TELEGRAM_API_URL;

/// How chat updates reach the bot; the watcher itself always polls the chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    LongPolling,
    Webhook,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
    pub api_url: String,
    pub delivery: DeliveryMode,
    pub webhook_bind: String,
    /// getUpdates long-poll window, seconds
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            chat_id: String::new(),
            api_url: TELEGRAM_API_URL.to_string(),
            delivery: DeliveryMode::LongPolling,
            webhook_bind: "0.0.0.0:8080".to_string(),
            poll_timeout_secs: 50,
        }
    }
}

impl TelegramConfig {
    pub fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }
}
