// libs/diagnostics-cell/src/models.rs
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use shared_database::LedgerError;
use shared_models::error::AppError;
use shared_models::status::BookingStatus;
use shared_models::time as hm_time;

// ==============================================================================
// WALK-IN SERVICE BOOKINGS
// ==============================================================================
//
// Lab and radiology bookings predate a patient record: the subject is
// captured as free-text name + contact, with an optional email for
// lifecycle notices.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabBooking {
    pub id: i64,
    pub patient_name: String,
    pub patient_contact: String,
    pub patient_email: Option<String>,
    pub test_id: Option<i64>,
    pub test_name: String,
    pub booking_date: NaiveDate,
    #[serde(with = "hm_time")]
    pub booking_time: NaiveTime,
    pub status: BookingStatus,
    pub notes: Option<String>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadiologyBooking {
    pub id: i64,
    pub patient_name: String,
    pub patient_contact: String,
    pub patient_email: Option<String>,
    pub service_id: Option<i64>,
    pub service_name: String,
    pub booking_date: NaiveDate,
    #[serde(with = "hm_time")]
    pub booking_time: NaiveTime,
    pub status: BookingStatus,
    pub notes: Option<String>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Catalog row read only for its preparation instructions.
#[derive(Debug, Clone, Deserialize)]
pub struct RadiologyService {
    pub id: i64,
    pub preparation: Option<String>,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLabBookingRequest {
    pub patient_name: String,
    pub patient_contact: String,
    pub patient_email: Option<String>,
    pub test_id: Option<i64>,
    pub test_name: String,
    pub booking_date: NaiveDate,
    #[serde(default, with = "hm_time::option")]
    pub booking_time: Option<NaiveTime>,
    pub notes: Option<String>,
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRadiologyBookingRequest {
    pub patient_name: String,
    pub patient_contact: String,
    pub patient_email: Option<String>,
    pub service_id: Option<i64>,
    pub service_name: String,
    pub booking_date: NaiveDate,
    #[serde(default, with = "hm_time::option")]
    pub booking_time: Option<NaiveTime>,
    pub notes: Option<String>,
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateServiceBookingRequest {
    pub status: Option<BookingStatus>,
    pub notes: Option<String>,
    pub amount: Option<f64>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ServiceBookingError {
    #[error("Booking not found")]
    NotFound,

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

impl From<ServiceBookingError> for AppError {
    fn from(err: ServiceBookingError) -> Self {
        match err {
            ServiceBookingError::NotFound => AppError::NotFound("Not found".to_string()),
            ServiceBookingError::InvalidTransition { from, to } => {
                AppError::Validation(format!("Cannot change status from {} to {}", from, to))
            }
            ServiceBookingError::Validation(msg) => AppError::Validation(msg),
            ServiceBookingError::Ledger(LedgerError::Conflict(msg)) => AppError::Conflict(msg),
            ServiceBookingError::Ledger(e) => AppError::Database(e.to_string()),
        }
    }
}
