use crate::api::twilio::MessageSender;
use crate::db::Storage;
use crate::handlers::{cron::cron_handler, webhook::webhook_handler};
use crate::service::InboundJob;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Shared per-request state: the persistence gateway, the outbound sender,
/// and the job channel feeding the post-acknowledgment worker.
#[derive(Clone)]
pub struct BotState {
    pub storage: Storage,
    pub sender: Arc<dyn MessageSender>,
    pub jobs: mpsc::Sender<InboundJob>,
}

impl BotState {
    pub fn new(
        storage: Storage,
        sender: Arc<dyn MessageSender>,
        jobs: mpsc::Sender<InboundJob>,
    ) -> Self {
        Self {
            storage,
            sender,
            jobs,
        }
    }
}

/// Build the HTTP surface. Method routing supplies the 405s for wrong verbs.
pub fn merkbot_router(state: BotState) -> Router {
    Router::new()
        .route("/webhook", post(webhook_handler))
        .route("/cron", get(cron_handler))
        .with_state(state)
}
