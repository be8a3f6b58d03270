use crate::error::MerkbotError;
use crate::router::BotState;
use crate::service::InboundJob;
use axum::{Form, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use tracing::{debug, info};

/// Provider webhook payload (form-encoded). Media fields are accepted so the
/// voice stub can react; nothing is fetched from the URLs.
#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: String,
    #[serde(rename = "NumMedia", default)]
    pub num_media: u32,
    #[serde(rename = "MediaUrl0", default)]
    pub media_url: Option<String>,
    #[serde(rename = "MediaContentType0", default)]
    pub media_content_type: Option<String>,
}

/// POST /webhook. The provider enforces a short response budget, so the
/// handler only enqueues and acknowledges; everything user-visible happens in
/// the worker after the 200 has gone out.
pub async fn webhook_handler(
    State(state): State<BotState>,
    Form(payload): Form<InboundMessage>,
) -> Result<impl IntoResponse, MerkbotError> {
    info!(from = %payload.from, media = payload.num_media, "incoming message");
    if payload.num_media > 0 {
        debug!(
            media_url = ?payload.media_url,
            media_content_type = ?payload.media_content_type,
            "message carries media"
        );
    }

    state
        .jobs
        .try_send(InboundJob {
            from: payload.from,
            body: payload.body,
            num_media: payload.num_media,
        })
        .map_err(|e| MerkbotError::QueueUnavailable(e.to_string()))?;

    Ok((StatusCode::OK, "OK"))
}
