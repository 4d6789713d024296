use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use shared_models::status::{BookingDomain, StatusEvent};
use shared_models::time as hm_time;

/// Everything the mail collaborator needs to render a lifecycle notice.
/// Captured at dispatch time so the worker never re-reads the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingSnapshot {
    /// Human-facing reference, e.g. `APT-12`, `LAB-3`.
    pub reference: String,
    pub domain: BookingDomain,
    pub patient_name: String,
    pub service_name: String,
    pub department: Option<String>,
    pub provider_name: Option<String>,
    pub date: Option<NaiveDate>,
    #[serde(default, with = "hm_time::option")]
    pub time: Option<NaiveTime>,
    pub amount: f64,
    /// Visit reason or preparation instructions, when there are any.
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub recipient: String,
    pub event: StatusEvent,
    pub snapshot: BookingSnapshot,
}

impl NotificationRequest {
    /// Subject line, matching what the front desk has always sent out.
    pub fn subject(&self, hospital_name: &str) -> String {
        let noun = match self.snapshot.domain {
            BookingDomain::Consultation => "Appointment",
            BookingDomain::Laboratory => "Lab Booking",
            BookingDomain::Radiology => "Radiology Booking",
            BookingDomain::Admission => "Admission",
        };
        format!("{} {} — {}", noun, self.event, hospital_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_models::status::{BookingDomain, StatusEvent};

    fn snapshot(domain: BookingDomain) -> BookingSnapshot {
        BookingSnapshot {
            reference: "APT-1".to_string(),
            domain,
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

    #[test]
    fn subject_names_the_domain_and_event() {
        let req = NotificationRequest {
            recipient: "jane@example.com".to_string(),
            event: StatusEvent::Confirmed,
            snapshot: snapshot(BookingDomain::Consultation),
        };
        assert_eq!(
            req.subject("MediCare Plus Hospital"),
            "Appointment Confirmed — MediCare Plus Hospital"
        );

        let req = NotificationRequest {
            recipient: "jane@example.com".to_string(),
            event: StatusEvent::Cancelled,
            snapshot: snapshot(BookingDomain::Laboratory),
        };
        assert_eq!(
            req.subject("MediCare Plus Hospital"),
            "Lab Booking Cancelled — MediCare Plus Hospital"
        );
    }
}
