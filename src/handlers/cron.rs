use crate::error::MerkbotError;
use crate::router::BotState;
use crate::service::sweep;
use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SweepReport {
    pub message: String,
    pub total: usize,
    pub sent: usize,
    pub errors: usize,
    pub timestamp: DateTime<Utc>,
}

/// GET /cron, hit by an external timer. Runs one sweep pass and reports its
/// counts; only the initial due-reminder query can fail the request.
pub async fn cron_handler(State(state): State<BotState>) -> Result<Json<SweepReport>, MerkbotError> {
    let now = Utc::now();
    let summary = sweep::run(&state.storage, state.sender.as_ref(), now).await?;

    Ok(Json(SweepReport {
        message: "Sweep completed".to_string(),
        total: summary.total,
        sent: summary.sent,
        errors: summary.errors,
        timestamp: now,
    }))
}
