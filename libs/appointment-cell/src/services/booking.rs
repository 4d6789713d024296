// libs/appointment-cell/src/services/booking.rs
use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use notification_cell::{BookingSnapshot, NotificationDispatcher};
use shared_config::AppConfig;
use shared_database::{LedgerClient, LedgerError};
use shared_models::status::{status_event, BookingDomain, BookingStatus, StatusEvent};

use crate::models::{
    Appointment, AppointmentDetail, AppointmentError, AppointmentListQuery,
    BookAppointmentRequest, Doctor, Patient, RescheduleAppointmentRequest,
    UpdateAppointmentRequest,
};

/// Owns every mutation of a consultation booking. The ledger row is
/// re-read before each decision, and notification dispatch happens only
/// after the write has committed.
pub struct AppointmentBookingService {
    ledger: Arc<LedgerClient>,
    notifier: Arc<NotificationDispatcher>,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig, notifier: Arc<NotificationDispatcher>) -> Self {
        Self {
            ledger: Arc::new(LedgerClient::new(config)),
            notifier,
        }
    }

    pub fn ledger(&self) -> Arc<LedgerClient> {
        Arc::clone(&self.ledger)
    }

    /// Create a booking in `Pending`. Deliberately no conflict check here:
    /// several pending requests may hold the same slot, and the contest is
    /// settled at confirmation time.
    pub async fn create(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Booking appointment for patient {} with doctor {}",
            request.patient_id, request.doctor_id
        );

        self.verify_patient_exists(request.patient_id).await?;
        self.verify_doctor_exists(request.doctor_id).await?;

        let row = json!({
            "patient_id": request.patient_id,
            "doctor_id": request.doctor_id,
            "appointment_date": request.appointment_date,
            "appointment_time": request.appointment_time.format("%H:%M").to_string(),
            "reason": request.reason.unwrap_or_else(|| "General Consultation".to_string()),
            "status": BookingStatus::Pending.to_string(),
            "amount": 0,
        });

        let appointment: Appointment = self.ledger.insert("appointments", row).await?;
        info!("Appointment {} created in Pending", appointment.id);
        Ok(appointment)
    }

    pub async fn get(&self, appointment_id: i64) -> Result<Appointment, AppointmentError> {
        self.ledger
            .fetch_one("appointments", &format!("id=eq.{}", appointment_id))
            .await?
            .ok_or(AppointmentError::NotFound)
    }

    pub async fn get_detail(
        &self,
        appointment_id: i64,
    ) -> Result<AppointmentDetail, AppointmentError> {
        let appointment = self.get(appointment_id).await?;
        let patient = self.fetch_patient(appointment.patient_id).await?;
        let doctor = self.fetch_doctor(appointment.doctor_id).await?;

        Ok(AppointmentDetail {
            patient_name: patient.full_name(),
            patient_email: patient.email,
            doctor_name: doctor.name,
            department: doctor.department,
            appointment,
        })
    }

    /// List bookings newest-first, optionally filtered by status and/or
    /// scoped to one doctor (a doctor session sees only their own).
    pub async fn list(
        &self,
        query: AppointmentListQuery,
    ) -> Result<Vec<AppointmentDetail>, AppointmentError> {
        let mut filters = vec!["order=id.desc".to_string()];
        if let Some(status) = query.status {
            filters.push(format!("status=eq.{}", status));
        }
        if let Some(doctor_id) = query.doctor_id {
            filters.push(format!("doctor_id=eq.{}", doctor_id));
        }

        let appointments: Vec<Appointment> = self
            .ledger
            .fetch("appointments", &filters.join("&"))
            .await?;

        let patients: Vec<Patient> = self.ledger.fetch("patients", "").await?;
        let doctors: Vec<Doctor> = self.ledger.fetch("doctors", "").await?;
        let patients: HashMap<i64, &Patient> = patients.iter().map(|p| (p.id, p)).collect();
        let doctors: HashMap<i64, &Doctor> = doctors.iter().map(|d| (d.id, d)).collect();

        Ok(appointments
            .into_iter()
            .map(|appointment| {
                let patient = patients.get(&appointment.patient_id);
                let doctor = doctors.get(&appointment.doctor_id);
                AppointmentDetail {
                    patient_name: patient
                        .map(|p| p.full_name())
                        .unwrap_or_else(|| "Unknown".to_string()),
                    patient_email: patient.and_then(|p| p.email.clone()),
                    doctor_name: doctor
                        .map(|d| d.name.clone())
                        .unwrap_or_else(|| "Unknown".to_string()),
                    department: doctor.and_then(|d| d.department.clone()),
                    appointment,
                }
            })
            .collect())
    }

    /// Move a booking to a new slot. Rejected with a conflict when a
    /// *different* booking is already `Confirmed` there; otherwise the
    /// booking goes back to `Pending` and must be re-confirmed.
    pub async fn reschedule(
        &self,
        appointment_id: i64,
        request: RescheduleAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Rescheduling appointment: {}", appointment_id);

        let current = self.get(appointment_id).await?;
        let new_date = request.appointment_date.unwrap_or(current.appointment_date);
        let new_time = request.appointment_time;

        let clash: Vec<Appointment> = self
            .ledger
            .fetch(
                "appointments",
                &format!(
                    "doctor_id=eq.{}&appointment_date=eq.{}&appointment_time=eq.{}&status=eq.{}&id=neq.{}",
                    current.doctor_id,
                    new_date,
                    new_time.format("%H:%M"),
                    BookingStatus::Confirmed,
                    appointment_id
                ),
            )
            .await?;
        if !clash.is_empty() {
            warn!(
                "Reschedule conflict for appointment {} at {} {}",
                appointment_id, new_date, new_time
            );
            return Err(AppointmentError::SlotConflict);
        }

        let patch = json!({
            "appointment_date": new_date,
            "appointment_time": new_time.format("%H:%M").to_string(),
            "status": BookingStatus::Pending.to_string(),
        });
        let mut updated: Vec<Appointment> = self
            .ledger
            .update("appointments", &format!("id=eq.{}", appointment_id), patch)
            .await?;
        let appointment = updated.pop().ok_or(AppointmentError::NotFound)?;

        info!(
            "Appointment {} rescheduled to {} {}",
            appointment_id, new_date, new_time
        );
        self.dispatch_notice(StatusEvent::Rescheduled, &appointment).await;

        Ok(appointment)
    }

    /// Apply a status/reason/amount update and emit whatever notice the
    /// transition calls for. The status write is a single conditional PATCH;
    /// the ledger's unique confirmed-slot constraint turns a lost
    /// confirmation race into a structured conflict.
    pub async fn update(
        &self,
        appointment_id: i64,
        request: UpdateAppointmentRequest,
    ) -> Result<(Appointment, BookingStatus, BookingStatus), AppointmentError> {
        debug!("Updating appointment: {}", appointment_id);

        let current = self.get(appointment_id).await?;
        let old_status = current.status;
        let new_status = request.status.unwrap_or(old_status);

        if !old_status.can_transition(BookingDomain::Consultation, new_status) {
            return Err(AppointmentError::InvalidTransition {
                from: old_status,
                to: new_status,
            });
        }

        if let Some(amount) = request.amount {
            if amount < 0.0 {
                return Err(AppointmentError::Validation(
                    "amount cannot be negative".to_string(),
                ));
            }
        }

        let mut patch = Map::new();
        patch.insert("status".to_string(), json!(new_status.to_string()));
        if let Some(reason) = request.reason {
            patch.insert("reason".to_string(), json!(reason));
        }
        if let Some(amount) = request.amount {
            patch.insert("amount".to_string(), json!(amount));
        }

        let updated: Result<Vec<Appointment>, LedgerError> = self
            .ledger
            .update(
                "appointments",
                &format!("id=eq.{}", appointment_id),
                Value::Object(patch),
            )
            .await;

        let mut updated = match updated {
            Ok(rows) => rows,
            // another booking won the slot between our read and this write
            Err(LedgerError::Conflict(_)) => return Err(AppointmentError::SlotConflict),
            Err(e) => return Err(e.into()),
        };
        let appointment = updated.pop().ok_or(AppointmentError::NotFound)?;

        if let Some(event) = status_event(old_status, new_status) {
            self.dispatch_notice(event, &appointment).await;
        }

        info!(
            "Appointment {} updated: {} -> {}",
            appointment_id, old_status, new_status
        );
        Ok((appointment, old_status, new_status))
    }

    pub async fn delete(&self, appointment_id: i64) -> Result<(), AppointmentError> {
        let _ = self.get(appointment_id).await?;
        self.ledger
            .delete("appointments", &format!("id=eq.{}", appointment_id))
            .await?;
        info!("Appointment {} deleted", appointment_id);
        Ok(())
    }

    /// Whether any bookings reference this doctor; the doctor CRUD layer
    /// refuses deletion while this holds.
    pub async fn doctor_has_appointments(&self, doctor_id: i64) -> Result<bool, AppointmentError> {
        let rows: Vec<Appointment> = self
            .ledger
            .fetch(
                "appointments",
                &format!("doctor_id=eq.{}&limit=1", doctor_id),
            )
            .await?;
        Ok(!rows.is_empty())
    }

    pub async fn patient_has_appointments(
        &self,
        patient_id: i64,
    ) -> Result<bool, AppointmentError> {
        let rows: Vec<Appointment> = self
            .ledger
            .fetch(
                "appointments",
                &format!("patient_id=eq.{}&limit=1", patient_id),
            )
            .await?;
        Ok(!rows.is_empty())
    }

    // ==============================================================================
    // PRIVATE HELPERS
    // ==============================================================================

    async fn verify_patient_exists(&self, patient_id: i64) -> Result<(), AppointmentError> {
        let patient: Option<Patient> = self
            .ledger
            .fetch_one("patients", &format!("id=eq.{}", patient_id))
            .await?;
        if patient.is_none() {
            return Err(AppointmentError::PatientNotFound);
        }
        Ok(())
    }

    async fn verify_doctor_exists(&self, doctor_id: i64) -> Result<(), AppointmentError> {
        let doctor: Option<Doctor> = self
            .ledger
            .fetch_one("doctors", &format!("id=eq.{}", doctor_id))
            .await?;
        if doctor.is_none() {
            return Err(AppointmentError::DoctorNotFound);
        }
        Ok(())
    }

    async fn fetch_patient(&self, patient_id: i64) -> Result<Patient, AppointmentError> {
        self.ledger
            .fetch_one("patients", &format!("id=eq.{}", patient_id))
            .await?
            .ok_or(AppointmentError::PatientNotFound)
    }

    async fn fetch_doctor(&self, doctor_id: i64) -> Result<Doctor, AppointmentError> {
        self.ledger
            .fetch_one("doctors", &format!("id=eq.{}", doctor_id))
            .await?
            .ok_or(AppointmentError::DoctorNotFound)
    }

    /// Best-effort, post-commit. Any failure here is logged and dropped —
    /// the booking mutation has already succeeded.
    async fn dispatch_notice(&self, event: StatusEvent, appointment: &Appointment) {
        let (patient, doctor) = match (
            self.fetch_patient(appointment.patient_id).await,
            self.fetch_doctor(appointment.doctor_id).await,
        ) {
            (Ok(p), Ok(d)) => (p, d),
            (p, d) => {
                warn!(
                    "Skipping {} notice for appointment {}: {:?} {:?}",
                    event,
                    appointment.id,
                    p.err(),
                    d.err()
                );
                return;
            }
        };

        let Some(email) = patient.email.clone() else {
            debug!(
                "No email on file for patient {} — skipping {} notice",
                patient.id, event
            );
            return;
        };

        let snapshot = BookingSnapshot {
            reference: format!("APT-{}", appointment.id),
            domain: BookingDomain::Consultation,
            patient_name: patient.full_name(),
            service_name: format!("Consultation — {}", doctor.name),
            department: doctor.department.clone(),
            provider_name: Some(doctor.name),
            date: Some(appointment.appointment_date),
            time: Some(appointment.appointment_time),
            amount: appointment.amount,
            details: appointment.reason.clone(),
        };

        self.notifier.notify(&email, event, snapshot);
    }
}
