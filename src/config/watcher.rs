use serde::Deserialize;
use serde::Serialize;

use crate::constants::PUMP_FUN_URL;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// Watched account, base58
    pub wallet: String,
    pub poll_interval_secs: u64,
    /// How many recent signatures each tick asks for. Must cover the
    /// expected arrival rate over one interval or events fall off the tail.
    pub signature_limit: usize,
    pub cooldown_secs: u64,
    pub error_notify_secs: u64,
    pub heartbeat_secs: u64,
    pub startup_delay_secs: u64,
    pub prepump: PrepumpConfig,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            wallet: String::new(),
            poll_interval_secs: 15,
            signature_limit: 5,
            cooldown_secs: 120,
            error_notify_secs: 60,
            heartbeat_secs: 3600,
            startup_delay_secs: 3,
            prepump: PrepumpConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepumpConfig {
    pub enabled: bool,
    pub check_interval_secs: u64,
    pub base_url: String,
}

impl Default for PrepumpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            check_interval_secs: 30,
            base_url: PUMP_FUN_URL.to_string(),
        }
    }
}
