// libs/diagnostics-cell/src/services/booking.rs
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use notification_cell::{BookingSnapshot, NotificationDispatcher};
use shared_config::AppConfig;
use shared_database::LedgerClient;
use shared_models::status::{status_event, BookingDomain, BookingStatus};

use crate::models::{
    LabBooking, RadiologyBooking, RadiologyService, ServiceBookingError,
    UpdateServiceBookingRequest,
};

/// Seam between the shared booking flow and a concrete walk-in domain:
/// which table it lives in, how it reads on a bill, and what its
/// notification snapshot looks like.
#[async_trait]
pub trait AncillaryBooking:
    DeserializeOwned + Serialize + Clone + Send + Sync + 'static
{
    const TABLE: &'static str;
    const PREFIX: &'static str;
    const DOMAIN: BookingDomain;

    fn id(&self) -> i64;
    fn status(&self) -> BookingStatus;
    fn recipient(&self) -> Option<&str>;
    fn snapshot(&self) -> BookingSnapshot;

    /// Hook for domain extras on the snapshot (e.g. preparation
    /// instructions); failures must degrade to a plain snapshot.
    async fn enrich_snapshot(&self, _ledger: &LedgerClient, _snapshot: &mut BookingSnapshot) {}
}

#[async_trait]
impl AncillaryBooking for LabBooking {
    const TABLE: &'static str = "lab_bookings";
    const PREFIX: &'static str = "LAB";
    const DOMAIN: BookingDomain = BookingDomain::Laboratory;

    fn id(&self) -> i64 {
        self.id
    }

    fn status(&self) -> BookingStatus {
        self.status
    }

    fn recipient(&self) -> Option<&str> {
        self.patient_email.as_deref()
    }

    fn snapshot(&self) -> BookingSnapshot {
        BookingSnapshot {
            reference: format!("{}-{}", Self::PREFIX, self.id),
            domain: Self::DOMAIN,
            patient_name: self.patient_name.clone(),
            service_name: self.test_name.clone(),
            department: Some("Laboratory".to_string()),
            provider_name: None,
            date: Some(self.booking_date),
            time: Some(self.booking_time),
            amount: self.amount,
            details: None,
        }
    }
}

#[async_trait]
impl AncillaryBooking for RadiologyBooking {
    const TABLE: &'static str = "radiology_bookings";
    const PREFIX: &'static str = "RAD";
    const DOMAIN: BookingDomain = BookingDomain::Radiology;

    fn id(&self) -> i64 {
        self.id
    }

    fn status(&self) -> BookingStatus {
        self.status
    }

    fn recipient(&self) -> Option<&str> {
        self.patient_email.as_deref()
    }

    fn snapshot(&self) -> BookingSnapshot {
        BookingSnapshot {
            reference: format!("{}-{}", Self::PREFIX, self.id),
            domain: Self::DOMAIN,
            patient_name: self.patient_name.clone(),
            service_name: self.service_name.clone(),
            department: Some("Radiology".to_string()),
            provider_name: None,
            date: Some(self.booking_date),
            time: Some(self.booking_time),
            amount: self.amount,
            details: None,
        }
    }

    /// Imaging notices carry the study's preparation instructions.
    async fn enrich_snapshot(&self, ledger: &LedgerClient, snapshot: &mut BookingSnapshot) {
        let Some(service_id) = self.service_id else {
            return;
        };
        match ledger
            .fetch_one::<RadiologyService>("radiology_services", &format!("id=eq.{}", service_id))
            .await
        {
            Ok(Some(service)) => snapshot.details = service.preparation,
            Ok(None) => {}
            Err(err) => warn!(
                "Could not load preparation for radiology service {}: {}",
                service_id, err
            ),
        }
    }
}

/// One booking flow for every walk-in service domain.
pub struct AncillaryBookingService<B> {
    ledger: Arc<LedgerClient>,
    notifier: Arc<NotificationDispatcher>,
    _domain: PhantomData<B>,
}

impl<B: AncillaryBooking> AncillaryBookingService<B> {
    pub fn new(config: &AppConfig, notifier: Arc<NotificationDispatcher>) -> Self {
        Self {
            ledger: Arc::new(LedgerClient::new(config)),
            notifier,
            _domain: PhantomData,
        }
    }

    /// Insert a walk-in booking; it starts `Pending` like every booking.
    pub async fn create(&self, mut row: Map<String, Value>) -> Result<B, ServiceBookingError> {
        row.insert(
            "status".to_string(),
            json!(BookingStatus::Pending.to_string()),
        );
        let booking: B = self.ledger.insert(B::TABLE, Value::Object(row)).await?;
        info!("{} booking {} created", B::DOMAIN, booking.id());
        Ok(booking)
    }

    pub async fn list(&self) -> Result<Vec<B>, ServiceBookingError> {
        Ok(self
            .ledger
            .fetch(B::TABLE, "order=created_at.desc")
            .await?)
    }

    pub async fn get(&self, id: i64) -> Result<B, ServiceBookingError> {
        self.ledger
            .fetch_one(B::TABLE, &format!("id=eq.{}", id))
            .await?
            .ok_or(ServiceBookingError::NotFound)
    }

    /// Status/notes/amount update with the shared lifecycle rules; emits a
    /// notice only when the status value actually changed, after the write
    /// committed.
    pub async fn update(
        &self,
        id: i64,
        request: UpdateServiceBookingRequest,
    ) -> Result<(B, BookingStatus, BookingStatus), ServiceBookingError> {
        debug!("Updating {} booking {}", B::DOMAIN, id);

        let current = self.get(id).await?;
        let old_status = current.status();
        let new_status = request.status.unwrap_or(old_status);

        if !old_status.can_transition(B::DOMAIN, new_status) {
            return Err(ServiceBookingError::InvalidTransition {
                from: old_status,
                to: new_status,
            });
        }

        if let Some(amount) = request.amount {
            if amount < 0.0 {
                return Err(ServiceBookingError::Validation(
                    "amount cannot be negative".to_string(),
                ));
            }
        }

        let mut patch = Map::new();
        patch.insert("status".to_string(), json!(new_status.to_string()));
        if let Some(notes) = request.notes {
            patch.insert("notes".to_string(), json!(notes));
        }
        if let Some(amount) = request.amount {
            patch.insert("amount".to_string(), json!(amount));
        }

        let mut updated: Vec<B> = self
            .ledger
            .update(B::TABLE, &format!("id=eq.{}", id), Value::Object(patch))
            .await?;
        let booking = updated.pop().ok_or(ServiceBookingError::NotFound)?;

        if let Some(event) = status_event(old_status, new_status) {
            if let Some(recipient) = booking.recipient().map(|r| r.to_string()) {
                let mut snapshot = booking.snapshot();
                booking.enrich_snapshot(&self.ledger, &mut snapshot).await;
                self.notifier.notify(&recipient, event, snapshot);
            } else {
                debug!(
                    "No email on {} booking {} — skipping {} notice",
                    B::DOMAIN,
                    id,
                    event
                );
            }
        }

        info!(
            "{} booking {} updated: {} -> {}",
            B::DOMAIN,
            id,
            old_status,
            new_status
        );
        Ok((booking, old_status, new_status))
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceBookingError> {
        let _ = self.get(id).await?;
        self.ledger
            .delete(B::TABLE, &format!("id=eq.{}", id))
            .await?;
        info!("{} booking {} deleted", B::DOMAIN, id);
        Ok(())
    }
}
