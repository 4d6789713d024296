// libs/appointment-cell/src/models.rs
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use shared_database::LedgerError;
use shared_models::error::AppError;
use shared_models::status::BookingStatus;
use shared_models::time as hm_time;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appointment_date: NaiveDate,
    #[serde(with = "hm_time")]
    pub appointment_time: NaiveTime,
    pub reason: Option<String>,
    pub status: BookingStatus,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Appointment joined with the names a front-desk screen shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentDetail {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub patient_name: String,
    pub patient_email: Option<String>,
    pub doctor_name: String,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub contact: Option<String>,
    pub email: Option<String>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub name: String,
    pub department: Option<String>,
    pub specialization: Option<String>,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appointment_date: NaiveDate,
    #[serde(with = "hm_time")]
    pub appointment_time: NaiveTime,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub status: Option<BookingStatus>,
    pub reason: Option<String>,
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub appointment_date: Option<NaiveDate>,
    #[serde(with = "hm_time")]
    pub appointment_time: NaiveTime,
}

#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub doctor_id: i64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    #[serde(with = "hm_time")]
    pub time: NaiveTime,
    pub available: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppointmentListQuery {
    pub status: Option<BookingStatus>,
    pub doctor_id: Option<i64>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("This slot is already confirmed for another patient. Please choose a different slot.")]
    SlotConflict,

    #[error("Cannot change status from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
            AppointmentError::PatientNotFound => AppError::NotFound("Patient not found".to_string()),
            AppointmentError::DoctorNotFound => AppError::NotFound("Doctor not found".to_string()),
            AppointmentError::SlotConflict => AppError::Conflict(
                "This slot is already confirmed for another patient. Please choose a different slot."
                    .to_string(),
            ),
            AppointmentError::InvalidTransition { from, to } => {
                AppError::Validation(format!("Cannot change status from {} to {}", from, to))
            }
            AppointmentError::Validation(msg) => AppError::Validation(msg),
            AppointmentError::Ledger(e) => AppError::Database(e.to_string()),
        }
    }
}
