// libs/billing-cell/src/services/reconcile.rs
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::debug;

use shared_config::AppConfig;
use shared_database::LedgerClient;
use shared_models::status::{BookingDomain, BookingStatus};

use crate::models::{
    AdmissionRow, AppointmentRow, BillingRecord, DoctorRow, FinancialReport, FinancialSummary,
    PatientRow, ReportError, ServiceBookingRow,
};

/// Which summary bucket a status settles into. Every status lands in
/// exactly one bucket, so the report's totals always partition
/// `total_billed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettlementBucket {
    Collected,
    Pending,
    Cancelled,
}

fn bucket(status: BookingStatus) -> SettlementBucket {
    match status {
        // a discharge closes the episode, so its bill counts as collected
        BookingStatus::Completed | BookingStatus::Discharged => SettlementBucket::Collected,
        BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::Admitted => {
            SettlementBucket::Pending
        }
        BookingStatus::Cancelled | BookingStatus::NoShow => SettlementBucket::Cancelled,
    }
}

/// Round to minor-unit precision. Applied at output time only so that
/// summing many small amounts never compounds rounding error.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Merges every booking domain into one date-descending ledger of billable
/// records plus summary totals.
pub struct ReconciliationService {
    ledger: Arc<LedgerClient>,
}

impl ReconciliationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            ledger: Arc::new(LedgerClient::new(config)),
        }
    }

    pub async fn financial_report(&self) -> Result<FinancialReport, ReportError> {
        debug!("Building unified financial report");

        let (appointments, patients, doctors, labs, radiology, admissions) = tokio::try_join!(
            self.ledger
                .fetch::<AppointmentRow>("appointments", "order=appointment_date.desc"),
            self.ledger.fetch::<PatientRow>("patients", ""),
            self.ledger.fetch::<DoctorRow>("doctors", ""),
            self.ledger
                .fetch::<ServiceBookingRow>("lab_bookings", "order=booking_date.desc"),
            self.ledger
                .fetch::<ServiceBookingRow>("radiology_bookings", "order=booking_date.desc"),
            self.ledger
                .fetch::<AdmissionRow>("admissions", "order=admit_date.desc"),
        )?;

        let patient_names: HashMap<i64, String> = patients
            .iter()
            .map(|p| (p.id, format!("{} {}", p.first_name, p.last_name)))
            .collect();
        let doctor_info: HashMap<i64, &DoctorRow> = doctors.iter().map(|d| (d.id, d)).collect();

        let mut records = Vec::new();

        for row in &appointments {
            let doctor = doctor_info.get(&row.doctor_id);
            records.push(BillingRecord {
                id: format!("APT-{}", row.id),
                domain: BookingDomain::Consultation,
                patient_name: patient_names
                    .get(&row.patient_id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string()),
                service_name: format!(
                    "Consultation — {}",
                    doctor.map(|d| d.name.as_str()).unwrap_or("Unknown")
                ),
                department: doctor
                    .and_then(|d| d.department.clone())
                    .unwrap_or_else(|| "General".to_string()),
                date: Some(row.appointment_date),
                status: row.status,
                amount: row.amount,
                note: String::new(),
            });
        }

        for row in &labs {
            records.push(service_record(row, "LAB", BookingDomain::Laboratory, "Laboratory"));
        }
        for row in &radiology {
            records.push(service_record(row, "RAD", BookingDomain::Radiology, "Radiology"));
        }

        for row in &admissions {
            let doctor = row.doctor_id.and_then(|id| doctor_info.get(&id));
            let mut service_name = format!("Admission — {}", row.ward);
            if let Some(room) = row.room_no.as_deref().filter(|r| !r.is_empty()) {
                service_name.push_str(&format!(" · {}", room));
            }
            records.push(BillingRecord {
                id: format!("ADM-{}", row.id),
                domain: BookingDomain::Admission,
                patient_name: patient_names
                    .get(&row.patient_id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string()),
                service_name,
                department: doctor
                    .and_then(|d| d.department.clone())
                    .unwrap_or_else(|| "Inpatient".to_string()),
                date: row.admit_date,
                status: row.status,
                amount: row.amount,
                note: row.diagnosis.clone().unwrap_or_default(),
            });
        }

        sort_date_descending(&mut records);
        let summary = summarize(&records);

        Ok(FinancialReport { records, summary })
    }
}

fn service_record(
    row: &ServiceBookingRow,
    prefix: &str,
    domain: BookingDomain,
    department: &str,
) -> BillingRecord {
    BillingRecord {
        id: format!("{}-{}", prefix, row.id),
        domain,
        patient_name: row.patient_name.clone(),
        service_name: row.service_name.clone(),
        department: department.to_string(),
        date: row.booking_date,
        status: row.status,
        amount: row.amount,
        note: String::new(),
    }
}

/// Newest first; records without a date sink to the end.
pub fn sort_date_descending(records: &mut [BillingRecord]) {
    records.sort_by(|a, b| match (a.date, b.date) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Totals over the merged ledger. Sums are accumulated at full precision
/// and rounded once, on the way out.
pub fn summarize(records: &[BillingRecord]) -> FinancialSummary {
    let mut total_billed = 0.0;
    let mut collected = 0.0;
    let mut pending = 0.0;
    let mut cancelled = 0.0;
    let mut by_type: BTreeMap<String, f64> = BTreeMap::new();

    for record in records {
        total_billed += record.amount;
        match bucket(record.status) {
            SettlementBucket::Collected => collected += record.amount,
            SettlementBucket::Pending => pending += record.amount,
            SettlementBucket::Cancelled => cancelled += record.amount,
        }
        *by_type.entry(record.domain.to_string()).or_insert(0.0) += record.amount;
    }

    for amount in by_type.values_mut() {
        *amount = round2(*amount);
    }

    FinancialSummary {
        total_billed: round2(total_billed),
        collected: round2(collected),
        pending: round2(pending),
        cancelled: round2(cancelled),
        total_records: records.len(),
        by_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(
        id: &str,
        domain: BookingDomain,
        date: Option<&str>,
        status: BookingStatus,
        amount: f64,
    ) -> BillingRecord {
        BillingRecord {
            id: id.to_string(),
            domain,
            patient_name: "Test Patient".to_string(),
            service_name: "Service".to_string(),
            department: "Dept".to_string(),
            date: date.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
            status,
            amount,
            note: String::new(),
        }
    }

    #[test]
    fn summary_matches_the_posted_amounts() {
        let records = vec![
            record("LAB-1", BookingDomain::Laboratory, Some("2025-06-02"), BookingStatus::Completed, 650.0),
            record("RAD-1", BookingDomain::Radiology, Some("2025-06-03"), BookingStatus::Cancelled, 3500.0),
            record("APT-1", BookingDomain::Consultation, Some("2025-06-01"), BookingStatus::Confirmed, 500.0),
        ];

        let summary = summarize(&records);
        assert_eq!(summary.collected, 650.0);
        assert_eq!(summary.pending, 500.0);
        assert_eq!(summary.cancelled, 3500.0);
        assert_eq!(summary.total_billed, 4650.0);
        assert_eq!(summary.total_records, 3);
        assert_eq!(summary.by_type["Laboratory"], 650.0);
        assert_eq!(summary.by_type["Radiology"], 3500.0);
        assert_eq!(summary.by_type["Consultation"], 500.0);
    }

    #[test]
    fn buckets_partition_every_status() {
        use BookingStatus::*;
        let statuses = [Pending, Confirmed, Completed, Cancelled, NoShow, Admitted, Discharged];
        let records: Vec<BillingRecord> = statuses
            .iter()
            .enumerate()
            .map(|(i, &status)| {
                record(&format!("APT-{}", i), BookingDomain::Consultation, None, status, 100.0)
            })
            .collect();

        let summary = summarize(&records);
        assert_eq!(
            summary.total_billed,
            summary.collected + summary.pending + summary.cancelled
        );
        assert_eq!(summary.total_billed, 700.0);
    }

    #[test]
    fn rounding_happens_once_at_output() {
        // each is exactly representable; the running sum is not
        let records: Vec<BillingRecord> = (0..10)
            .map(|i| {
                record(&format!("LAB-{}", i), BookingDomain::Laboratory, None, BookingStatus::Completed, 0.105)
            })
            .collect();

        let summary = summarize(&records);
        assert_eq!(summary.collected, 1.05);
        assert_eq!(summary.total_billed, 1.05);
    }

    #[test]
    fn sort_is_date_descending_with_undated_last() {
        let mut records = vec![
            record("APT-1", BookingDomain::Consultation, Some("2025-05-01"), BookingStatus::Pending, 0.0),
            record("ADM-1", BookingDomain::Admission, None, BookingStatus::Admitted, 0.0),
            record("APT-2", BookingDomain::Consultation, Some("2025-06-01"), BookingStatus::Pending, 0.0),
        ];

        sort_date_descending(&mut records);
        let order: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(order, vec!["APT-2", "APT-1", "ADM-1"]);
    }
}
