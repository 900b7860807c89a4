//! Webhook delivery mode: the provider pushes updates to us instead of the
//! bot polling for them. Also exposes the liveness endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::routing::post;
use axum::Json;
use axum::Router;
use tokio::sync::Mutex;
use tracing::info;

use super::api::TgUpdate;
use super::commands::dispatch_update;
use super::Notify;
use crate::config::TelegramConfig;
use crate::err_with_loc;
use crate::error::handler::HandlerError;
use crate::handler::shutdown::ShutdownSignal;
use crate::watcher::Watcher;
use crate::Result;

#[derive(Clone)]
pub struct WebhookState {
    pub telegram_config: Arc<TelegramConfig>,
    pub watcher: Arc<Mutex<Watcher>>,
    pub notifier: Arc<dyn Notify>,
}

pub fn webhook_router(state: WebhookState) -> Router {
    Router::new()
        .route("/webhook", post(receive_update))
        .route("/health", get(health))
        .with_state(state)
}

async fn receive_update(State(state): State<WebhookState>, Json(update): Json<TgUpdate>) -> &'static str {
    dispatch_update(&update, &state.telegram_config, &state.watcher, &state.notifier).await;
    "OK"
}

async fn health() -> &'static str {
    "OK"
}

pub async fn run_webhook_server(state: WebhookState, bind: &str, shutdown: ShutdownSignal) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| err_with_loc!(HandlerError::WebhookServerError(format!("bind {bind}: {e}"))))?;

    info!("webhook_listening::{}", bind);

    axum::serve(listener, webhook_router(state))
        .with_graceful_shutdown(async move { shutdown.wait_for_shutdown().await })
        .await
        .map_err(|e| err_with_loc!(HandlerError::WebhookServerError(e.to_string())))?;

    Ok(())
}
