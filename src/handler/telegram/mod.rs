pub mod api;
pub mod commands;
pub mod sender;
pub mod webhook;

use async_trait::async_trait;

use crate::constants::PUMP_FUN_URL;
use crate::constants::SOLSCAN_TOKEN_URL;
use crate::model::WatcherStatus;

/// Everything the bot ever says, rendered in one place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Online { wallet: String },
    Status(WatcherStatus),
    TokenCreated { mint: String },
    TokenLive { mint: String },
    Error { text: String },
    RateLimited { resume_secs: u64 },
    Heartbeat,
}

impl Notification {
    pub fn render(&self) -> String {
        match self {
            Notification::Online { wallet } => {
                format!("⚡ BOT ONLINE\n👛 Wallet:\n{wallet}")
            },
            Notification::Status(status) => {
                let hours = status.uptime_secs / 3600;
                let minutes = (status.uptime_secs % 3600) / 60;
                format!(
                    "📊 BOT STATUS\n\n✅ Online: {}\n⏱ Uptime: {hours}h {minutes}m\n\n👛 Wallet:\n{}",
                    if status.online { "YES" } else { "NO" },
                    status.wallet
                )
            },
            Notification::TokenCreated { mint } => {
                format!(
                    "🚀 NEW TOKEN CREATED\n\n🪙 Mint: {mint}\n\n🔥 Pump.fun:\n{PUMP_FUN_URL}/{mint}\n\n🔎 Solscan:\n{SOLSCAN_TOKEN_URL}/{mint}"
                )
            },
            Notification::TokenLive { mint } => {
                format!("🔥 TOKEN NOW LIVE\n\n🪙 Mint: {mint}\n\n{PUMP_FUN_URL}/{mint}")
            },
            Notification::Error { text } => format!("🚨 BOT ERROR\n\n{text}"),
            Notification::RateLimited { resume_secs } => {
                format!("⏳ RPC RATE LIMITED\n\nPausing wallet checks for {resume_secs}s")
            },
            Notification::Heartbeat => "💓 Bot alive and watching".to_string(),
        }
    }
}

/// Notification sink. Implementations must swallow delivery failures; a
/// broken chat channel must never stall the watch loop.
#[async_trait]
pub trait Notify: Send + Sync {
    async fn notify(&self, notification: Notification) -> crate::Result<()>;
}
