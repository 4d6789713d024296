use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub ledger_url: String,
    pub ledger_api_key: String,
    pub session_jwt_secret: String,
    pub hospital_name: String,
    pub mail_relay_url: String,
    pub mail_from: String,
    pub mail_enabled: bool,
    pub notify_queue_capacity: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            ledger_url: env::var("LEDGER_URL")
                .unwrap_or_else(|_| {
                    warn!("LEDGER_URL not set, using empty value");
                    String::new()
                }),
            ledger_api_key: env::var("LEDGER_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("LEDGER_API_KEY not set, using empty value");
                    String::new()
                }),
            session_jwt_secret: env::var("SESSION_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SESSION_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            hospital_name: env::var("HOSPITAL_NAME")
                .unwrap_or_else(|_| "MediCare Plus Hospital".to_string()),
            mail_relay_url: env::var("MAIL_RELAY_URL").unwrap_or_default(),
            mail_from: env::var("MAIL_FROM").unwrap_or_default(),
            mail_enabled: env::var("MAIL_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            notify_queue_capacity: env::var("NOTIFY_QUEUE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(256),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.ledger_url.is_empty()
            && !self.ledger_api_key.is_empty()
            && !self.session_jwt_secret.is_empty()
    }

    pub fn is_mail_configured(&self) -> bool {
        self.mail_enabled && !self.mail_relay_url.is_empty() && !self.mail_from.is_empty()
    }
}
