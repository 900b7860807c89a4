use thiserror::Error;

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Failed to send Telegram message: {0}")]
    SendTelegramError(String),
    #[error("Failed to poll Telegram updates: {0}")]
    PollUpdatesError(String),
    #[error("Webhook server error: {0}")]
    WebhookServerError(String),
}
