pub mod log;
pub mod rpc;
pub mod telegram;
pub mod watcher;

use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

pub use log::LoggingConfig;
pub use rpc::RpcConfig;
pub use telegram::DeliveryMode;
pub use telegram::TelegramConfig;
pub use watcher::PrepumpConfig;
pub use watcher::WatcherConfig;

use crate::error::config::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rpc: RpcConfig,
    pub telegram: TelegramConfig,
    pub watcher: WatcherConfig,
    pub logging: LoggingConfig,
}

/// Loads the optional TOML file, then applies environment overrides and
/// refuses to start while any required value is missing.
pub fn load_config(path: impl AsRef<Path>) -> crate::Result<Config> {
    dotenvy::dotenv().ok();

    let mut config = if path.as_ref().exists() {
        let config_str =
            std::fs::read_to_string(path).map_err(|e| ConfigError::OpenFileError(e.to_string()))?;
        toml::from_str::<Config>(&config_str).map_err(|e| ConfigError::ParseError(e.to_string()))?
    } else {
        Config::default()
    };

    config.apply_env();
    config.validate()?;
    Ok(config)
}

impl Config {
    fn apply_env(&mut self) {
        if let Ok(token) = std::env::var("TELEGRAM_TOKEN") {
            self.telegram.token = token;
        }
        if let Ok(chat_id) = std::env::var("TELEGRAM_CHAT_ID") {
            self.telegram.chat_id = chat_id;
        }
        if let Ok(url) = std::env::var("RPC_URL") {
            self.rpc.url = url;
        }
        if let Ok(wallet) = std::env::var("WALLET") {
            self.watcher.wallet = wallet;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("TELEGRAM_TOKEN", &self.telegram.token),
            ("TELEGRAM_CHAT_ID", &self.telegram.chat_id),
            ("RPC_URL", &self.rpc.url),
            ("WALLET", &self.watcher.wallet),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingRequired(name.to_string()));
            }
        }

        if self.watcher.signature_limit == 0 {
            return Err(ConfigError::InvalidValue(
                "watcher.signature_limit".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
