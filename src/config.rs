use crate::api::twilio::TwilioConfig;
use crate::error::MerkbotError;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use url::Url;

/// Process configuration, loaded once in `main` and passed into the service
/// constructors. Provider credentials intentionally default to empty strings:
/// a missing credential surfaces as a provider rejection at send time, the
/// database is created on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub loglevel: String,
    pub bind_addr: String,
    pub database_url: String,
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_from_number: String,
    pub twilio_api_base: Url,
    pub worker_queue_depth: usize,
    pub worker_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            loglevel: "info".to_string(),
            bind_addr: "0.0.0.0:8000".to_string(),
            database_url: "sqlite:merkbot.sqlite".to_string(),
            twilio_account_sid: String::new(),
            twilio_auth_token: String::new(),
            twilio_from_number: "whatsapp:+14155238886".to_string(),
            twilio_api_base: Url::parse("https://api.twilio.com")
                .expect("default Twilio API base must parse"),
            worker_queue_depth: 256,
            worker_concurrency: 4,
        }
    }
}

impl Config {
    /// Merge environment variables over the built-in defaults.
    /// Keys match field names case-insensitively (`DATABASE_URL`,
    /// `TWILIO_ACCOUNT_SID`, ...); unknown variables are ignored.
    pub fn from_env() -> Result<Self, MerkbotError> {
        let cfg = Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::raw().map(|key| key.as_str().to_ascii_lowercase().into()))
            .extract()?;
        Ok(cfg)
    }

    /// Configuration slice owned by the outbound message client.
    pub fn twilio(&self) -> TwilioConfig {
        TwilioConfig {
            api_base: self.twilio_api_base.clone(),
            account_sid: self.twilio_account_sid.clone(),
            auth_token: self.twilio_auth_token.clone(),
            from_number: self.twilio_from_number.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable_without_environment() {
        let cfg = Config::default();
        assert_eq!(cfg.loglevel, "info");
        assert!(cfg.database_url.starts_with("sqlite:"));
        assert!(cfg.twilio_account_sid.is_empty());
        assert!(cfg.worker_concurrency >= 1);
    }

    #[test]
    fn twilio_projection_carries_credentials() {
        let mut cfg = Config::default();
        cfg.twilio_account_sid = "AC123".to_string();
        cfg.twilio_auth_token = "secret".to_string();
        let twilio = cfg.twilio();
        assert_eq!(twilio.account_sid, "AC123");
        assert_eq!(twilio.auth_token, "secret");
        assert_eq!(twilio.from_number, cfg.twilio_from_number);
    }
}
