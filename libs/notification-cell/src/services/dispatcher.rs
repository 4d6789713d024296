use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_models::status::StatusEvent;

use crate::models::{BookingSnapshot, NotificationRequest};
use crate::services::mailer::{Mailer, NoopMailer, RelayMailer};

/// Fire-and-forget dispatch of booking lifecycle notices.
///
/// `notify` hands the request to a bounded channel and returns immediately;
/// one background worker makes a single delivery attempt per notice. Mail
/// failures are logged and swallowed — a booking mutation that already
/// committed must never be unwound or slowed down by the mail provider.
pub struct NotificationDispatcher {
    tx: mpsc::Sender<NotificationRequest>,
}

impl NotificationDispatcher {
    /// Spawn the delivery worker and return a handle for producers.
    pub fn spawn(mailer: Arc<dyn Mailer>, capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<NotificationRequest>(capacity.max(1));

        tokio::spawn(async move {
            while let Some(request) = rx.recv().await {
                match mailer.deliver(&request).await {
                    Ok(()) => debug!(
                        "Delivered {} notice for {}",
                        request.event, request.snapshot.reference
                    ),
                    // no retry: at most one attempt per transition
                    Err(err) => warn!(
                        "Failed to deliver {} notice for {} to {}: {:#}",
                        request.event, request.snapshot.reference, request.recipient, err
                    ),
                }
            }
            debug!("Notification worker stopped");
        });

        Self { tx }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let mailer: Arc<dyn Mailer> = if config.is_mail_configured() {
            Arc::new(RelayMailer::new(config))
        } else {
            Arc::new(NoopMailer)
        };
        Self::spawn(mailer, config.notify_queue_capacity)
    }

    /// Queue a notice. Never blocks and never fails the caller: a recipient
    /// without a usable address is skipped, and a full queue drops the
    /// notice with a warning.
    pub fn notify(&self, recipient: &str, event: StatusEvent, snapshot: BookingSnapshot) {
        if recipient.is_empty() || !recipient.contains('@') {
            debug!(
                "Notification skipped — invalid recipient for {}",
                snapshot.reference
            );
            return;
        }

        let request = NotificationRequest {
            recipient: recipient.to_string(),
            event,
            snapshot,
        };

        match self.tx.try_send(request) {
            Ok(()) => {}
            Err(TrySendError::Full(request)) => warn!(
                "Notification queue full — dropping {} notice for {}",
                request.event, request.snapshot.reference
            ),
            Err(TrySendError::Closed(request)) => warn!(
                "Notification worker gone — dropping {} notice for {}",
                request.event, request.snapshot.reference
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mailer::{FailingMailer, RecordingMailer};
    use shared_models::status::BookingDomain;
    use std::time::Duration;

    fn snapshot() -> BookingSnapshot {
        BookingSnapshot {
            reference: "APT-9".to_string(),
            domain: BookingDomain::Consultation,
            patient_name: "Jane Doe".to_string(),
            service_name: "Consultation — Dr. Lee".to_string(),
            department: Some("Cardiology".to_string()),
            provider_name: Some("Dr. Lee".to_string()),
            date: None,
            time: None,
            amount: 500.0,
            details: None,
        }
    }

    async fn wait_for_deliveries(mailer: &RecordingMailer, expected: usize) {
        for _ in 0..50 {
            if mailer.sent().len() >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn delivers_valid_notices() {
        let mailer = Arc::new(RecordingMailer::new());
        let dispatcher = NotificationDispatcher::spawn(mailer.clone(), 8);

        dispatcher.notify("jane@example.com", StatusEvent::Confirmed, snapshot());
        wait_for_deliveries(&mailer, 1).await;

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, "jane@example.com");
        assert_eq!(sent[0].event, StatusEvent::Confirmed);
    }

    #[tokio::test]
    async fn skips_recipients_without_an_address() {
        let mailer = Arc::new(RecordingMailer::new());
        let dispatcher = NotificationDispatcher::spawn(mailer.clone(), 8);

        dispatcher.notify("", StatusEvent::Confirmed, snapshot());
        dispatcher.notify("no-at-sign", StatusEvent::Cancelled, snapshot());
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn mailer_failure_never_reaches_the_caller() {
        let dispatcher = NotificationDispatcher::spawn(Arc::new(FailingMailer), 8);

        // must not panic or block
        dispatcher.notify("jane@example.com", StatusEvent::Completed, snapshot());
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
