// libs/admission-cell/src/models.rs
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use shared_database::LedgerError;
use shared_models::error::AppError;
use shared_models::status::BookingStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admission {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: Option<i64>,
    pub ward: String,
    pub room_no: Option<String>,
    pub bed_no: Option<String>,
    pub admit_date: NaiveDate,
    pub discharge_date: Option<NaiveDate>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    #[serde(default)]
    pub amount: f64,
    pub status: BookingStatus,
    pub notes: Option<String>,
    pub admitted_by: Option<i64>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Admission joined with display names for list views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionDetail {
    #[serde(flatten)]
    pub admission: Admission,
    pub patient_name: String,
    pub doctor_name: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmitPatientRequest {
    pub patient_id: i64,
    pub doctor_id: Option<i64>,
    pub ward: String,
    pub room_no: Option<String>,
    pub bed_no: Option<String>,
    pub admit_date: NaiveDate,
    pub discharge_date: Option<NaiveDate>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub amount: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAdmissionRequest {
    pub doctor_id: Option<i64>,
    pub ward: Option<String>,
    pub room_no: Option<String>,
    pub bed_no: Option<String>,
    pub admit_date: Option<NaiveDate>,
    pub discharge_date: Option<NaiveDate>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub amount: Option<f64>,
    pub status: Option<BookingStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    #[error("Admission not found")]
    NotFound,

    #[error("Patient not found")]
    PatientNotFound,

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

impl From<AdmissionError> for AppError {
    fn from(err: AdmissionError) -> Self {
        match err {
            AdmissionError::NotFound => AppError::NotFound("Not found".to_string()),
            AdmissionError::PatientNotFound => AppError::NotFound("Patient not found".to_string()),
            AdmissionError::InvalidTransition { from, to } => {
                AppError::Validation(format!("Cannot change status from {} to {}", from, to))
            }
            AdmissionError::Validation(msg) => AppError::Validation(msg),
            AdmissionError::Ledger(e) => AppError::Database(e.to_string()),
        }
    }
}
