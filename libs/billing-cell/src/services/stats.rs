// libs/billing-cell/src/services/stats.rs
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::LedgerClient;
use shared_models::status::BookingStatus;

use crate::models::{AppointmentRow, DashboardStats, DoctorRow, PatientRow, ReportError};

/// Read-only dashboard projection. With a doctor scope, every count is
/// restricted to that doctor's bookings; unscoped requests aggregate the
/// whole ledger.
pub struct StatsService {
    ledger: Arc<LedgerClient>,
}

impl StatsService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            ledger: Arc::new(LedgerClient::new(config)),
        }
    }

    pub async fn dashboard_stats(
        &self,
        scope: Option<i64>,
    ) -> Result<DashboardStats, ReportError> {
        debug!("Computing dashboard stats (scope: {:?})", scope);

        let appointment_filter = match scope {
            Some(doctor_id) => format!("doctor_id=eq.{}", doctor_id),
            None => String::new(),
        };

        let (appointments, patients, doctors) = tokio::try_join!(
            self.ledger
                .fetch::<AppointmentRow>("appointments", &appointment_filter),
            self.ledger.fetch::<PatientRow>("patients", ""),
            self.ledger.fetch::<DoctorRow>("doctors", ""),
        )?;

        let today = Utc::now().date_naive();

        let total_patients = match scope {
            // a doctor's patient count is the distinct patients they have seen
            Some(_) => {
                let seen: HashSet<i64> = appointments.iter().map(|a| a.patient_id).collect();
                seen.len() as i64
            }
            None => patients.len() as i64,
        };

        let count_status = |status: BookingStatus| -> i64 {
            appointments.iter().filter(|a| a.status == status).count() as i64
        };

        let mut by_day: BTreeMap<chrono::NaiveDate, i64> = BTreeMap::new();
        for appointment in &appointments {
            *by_day.entry(appointment.appointment_date).or_insert(0) += 1;
        }

        Ok(DashboardStats {
            total_patients,
            total_doctors: doctors.len() as i64,
            today_appointments: appointments
                .iter()
                .filter(|a| a.appointment_date == today)
                .count() as i64,
            pending: count_status(BookingStatus::Pending),
            confirmed: count_status(BookingStatus::Confirmed),
            completed: count_status(BookingStatus::Completed),
            cancelled: count_status(BookingStatus::Cancelled),
            no_show: count_status(BookingStatus::NoShow),
            total_appointments: appointments.len() as i64,
            by_day,
        })
    }
}
