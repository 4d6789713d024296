// libs/billing-cell/src/models.rs
use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use shared_database::LedgerError;
use shared_models::error::AppError;
use shared_models::status::{BookingDomain, BookingStatus};
use shared_models::time as hm_time;

// ==============================================================================
// UNIFIED LEDGER VIEW
// ==============================================================================

/// One billable event, whatever domain it came from, normalized for the
/// financial report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillingRecord {
    /// Prefixed reference, unique across domains: `APT-1`, `LAB-1`, ...
    pub id: String,
    #[serde(rename = "type")]
    pub domain: BookingDomain,
    pub patient_name: String,
    pub service_name: String,
    pub department: String,
    pub date: Option<NaiveDate>,
    pub status: BookingStatus,
    pub amount: f64,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialSummary {
    pub total_billed: f64,
    pub collected: f64,
    pub pending: f64,
    pub cancelled: f64,
    pub total_records: usize,
    pub by_type: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialReport {
    pub records: Vec<BillingRecord>,
    pub summary: FinancialSummary,
}

// ==============================================================================
// DASHBOARD STATS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_patients: i64,
    pub total_doctors: i64,
    pub today_appointments: i64,
    pub pending: i64,
    pub confirmed: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub no_show: i64,
    pub total_appointments: i64,
    pub by_day: BTreeMap<NaiveDate, i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub scope: Option<i64>,
}

// ==============================================================================
// LEDGER ROW SHAPES (only the columns the reports read)
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentRow {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appointment_date: NaiveDate,
    #[serde(default, with = "hm_time::option")]
    pub appointment_time: Option<NaiveTime>,
    pub status: BookingStatus,
    #[serde(default)]
    pub amount: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatientRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DoctorRow {
    pub id: i64,
    pub name: String,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceBookingRow {
    pub id: i64,
    pub patient_name: String,
    #[serde(alias = "test_name")]
    pub service_name: String,
    pub booking_date: Option<NaiveDate>,
    pub status: BookingStatus,
    #[serde(default)]
    pub amount: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdmissionRow {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: Option<i64>,
    pub ward: String,
    pub room_no: Option<String>,
    pub admit_date: Option<NaiveDate>,
    pub diagnosis: Option<String>,
    pub status: BookingStatus,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Ledger(e) => AppError::Database(e.to_string()),
        }
    }
}
