use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum MerkbotError {
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("Message provider rejected send with status: {0}")]
    ProviderStatus(StatusCode),

    #[error("Inbound queue unavailable: {0}")]
    QueueUnavailable(String),
}

impl IntoResponse for MerkbotError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            MerkbotError::Database(_)
            | MerkbotError::QueueUnavailable(_)
            | MerkbotError::Config(_) => {
                let body = ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
            MerkbotError::Http(_) | MerkbotError::UrlParse(_) => {
                let body = ApiErrorBody {
                    code: "BAD_GATEWAY".to_string(),
                    message: "Upstream service is unavailable.".to_string(),
                };
                (StatusCode::BAD_GATEWAY, body)
            }
            MerkbotError::ProviderStatus(code) => {
                let body = ApiErrorBody {
                    code: "PROVIDER_ERROR".to_string(),
                    message: "The message provider rejected the request.".to_string(),
                };
                (code, body)
            }
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
