use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::sync::Mutex;
use tracing::debug;

use shared_config::AppConfig;

use crate::models::NotificationRequest;

/// Boundary to the mail collaborator. Implementations own template
/// rendering and transport; callers only hand over the lifecycle event and
/// a snapshot of the booking.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn deliver(&self, request: &NotificationRequest) -> Result<()>;
}

/// Posts notices to an HTTP mail relay that renders and sends the actual
/// email.
pub struct RelayMailer {
    client: Client,
    endpoint: String,
    from: String,
    hospital_name: String,
}

impl RelayMailer {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.mail_relay_url.clone(),
            from: config.mail_from.clone(),
            hospital_name: config.hospital_name.clone(),
        }
    }
}

#[async_trait]
impl Mailer for RelayMailer {
    async fn deliver(&self, request: &NotificationRequest) -> Result<()> {
        let payload = json!({
            "to": request.recipient,
            "from": format!("{} <{}>", self.hospital_name, self.from),
            "subject": request.subject(&self.hospital_name),
            "event": request.event,
            "booking": request.snapshot,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("mail relay rejected notice ({}): {}", status, body));
        }

        debug!("Notice delivered to {}", request.recipient);
        Ok(())
    }
}

/// Used when mail is not configured; logs and drops every notice.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn deliver(&self, request: &NotificationRequest) -> Result<()> {
        debug!(
            "Mail disabled — skipping {} notice for {}",
            request.event, request.snapshot.reference
        );
        Ok(())
    }
}

/// Test double that records every delivery instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<NotificationRequest>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<NotificationRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn deliver(&self, request: &NotificationRequest) -> Result<()> {
        self.sent.lock().unwrap().push(request.clone());
        Ok(())
    }
}

/// Mailer that always fails; for exercising the swallow-and-log path.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn deliver(&self, _request: &NotificationRequest) -> Result<()> {
        Err(anyhow!("mail provider unreachable"))
    }
}
