use crate::error::MerkbotError;
use async_trait::async_trait;
use axum::http::StatusCode;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

/// Outbound delivery seam. The production implementation talks to the Twilio
/// Messages API; tests substitute recording or failing fakes.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<(), MerkbotError>;
}

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub api_base: Url,
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

pub struct TwilioClient {
    client: reqwest::Client,
    cfg: TwilioConfig,
}

impl TwilioClient {
    pub fn new(cfg: TwilioConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("merkbot/0.2")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()
            .expect("FATAL: initialize Twilio HTTP client failed");
        Self { client, cfg }
    }

    fn messages_url(&self) -> Result<Url, MerkbotError> {
        let path = format!(
            "/2010-04-01/Accounts/{}/Messages.json",
            self.cfg.account_sid
        );
        Ok(self.cfg.api_base.join(&path)?)
    }
}

#[async_trait]
impl MessageSender for TwilioClient {
    async fn send(&self, to: &str, body: &str) -> Result<(), MerkbotError> {
        let url = self.messages_url()?;
        let params = [
            ("From", self.cfg.from_number.as_str()),
            ("To", to),
            ("Body", body),
        ];

        let resp = self
            .client
            .post(url)
            .basic_auth(&self.cfg.account_sid, Some(&self.cfg.auth_token))
            .form(&params)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            error!(%status, %to, "Twilio rejected outbound message");
            return Err(MerkbotError::ProviderStatus(
                StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY),
            ));
        }

        debug!(%to, "outbound message accepted by Twilio");
        Ok(())
    }
}
