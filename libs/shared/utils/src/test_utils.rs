use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;

pub struct TestConfig {
    pub jwt_secret: String,
    pub ledger_url: String,
    pub ledger_api_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            ledger_url: "http://localhost:54321".to_string(),
            ledger_api_key: "test-ledger-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_ledger_url(url: &str) -> Self {
        Self {
            ledger_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            ledger_url: self.ledger_url.clone(),
            ledger_api_key: self.ledger_api_key.clone(),
            session_jwt_secret: self.jwt_secret.clone(),
            hospital_name: "MediCare Plus Hospital".to_string(),
            mail_relay_url: String::new(),
            mail_from: String::new(),
            mail_enabled: false,
            notify_queue_capacity: 16,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub role: String,
    pub doctor_id: Option<i64>,
}

impl TestUser {
    pub fn new(role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: role.to_string(),
            doctor_id: None,
        }
    }

    pub fn admin() -> Self {
        Self::new("admin")
    }

    pub fn frontdesk() -> Self {
        Self::new("frontdesk")
    }

    pub fn doctor(doctor_id: i64) -> Self {
        Self {
            doctor_id: Some(doctor_id),
            ..Self::new("doctor")
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "role": user.role,
            "doctor_id": user.doctor_id,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }
}

/// Canned ledger rows for wiremock-backed suites.
pub struct MockLedgerRows;

impl MockLedgerRows {
    pub fn patient(id: i64, name: &str, email: Option<&str>) -> Value {
        let (first, last) = name.split_once(' ').unwrap_or((name, ""));
        json!({
            "id": id,
            "first_name": first,
            "last_name": last,
            "date_of_birth": "1988-04-12",
            "gender": "Female",
            "blood_group": "O+",
            "contact": "+1-555-0100",
            "email": email,
            "address": null,
            "emergency_contact": null,
            "created_at": "2025-01-10T08:00:00"
        })
    }

    pub fn doctor(id: i64, name: &str, department: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "department": department,
            "specialization": "General Medicine",
            "contact": "+1-555-0101",
            "email": "doctor@example.com",
            "qualification": "MBBS, MD",
            "available": 1
        })
    }

    pub fn appointment(
        id: i64,
        patient_id: i64,
        doctor_id: i64,
        date: &str,
        time: &str,
        status: &str,
    ) -> Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "doctor_id": doctor_id,
            "appointment_date": date,
            "appointment_time": time,
            "reason": "Follow-up",
            "status": status,
            "amount": 0.0,
            "created_at": "2025-05-20T09:00:00"
        })
    }

    pub fn lab_booking(id: i64, status: &str, amount: f64, email: Option<&str>) -> Value {
        json!({
            "id": id,
            "patient_name": "Walk-in Patient",
            "patient_contact": "+1-555-0199",
            "patient_email": email,
            "test_id": 3,
            "test_name": "Complete Blood Count (CBC)",
            "booking_date": "2025-06-02",
            "booking_time": "09:30",
            "status": status,
            "notes": null,
            "amount": amount,
            "created_at": "2025-05-28T11:00:00"
        })
    }

    pub fn radiology_booking(id: i64, status: &str, amount: f64, email: Option<&str>) -> Value {
        json!({
            "id": id,
            "patient_name": "Walk-in Patient",
            "patient_contact": "+1-555-0199",
            "patient_email": email,
            "service_id": 2,
            "service_name": "MRI Brain",
            "booking_date": "2025-06-03",
            "booking_time": "14:00",
            "status": status,
            "notes": null,
            "amount": amount,
            "created_at": "2025-05-28T11:30:00"
        })
    }

    pub fn admission(id: i64, patient_id: i64, status: &str, amount: f64) -> Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "doctor_id": null,
            "ward": "General Ward",
            "room_no": "204",
            "bed_no": "B",
            "admit_date": "2025-05-25",
            "discharge_date": null,
            "diagnosis": "Observation",
            "treatment": null,
            "amount": amount,
            "status": status,
            "notes": null,
            "admitted_by": 1,
            "created_at": "2025-05-25T16:45:00"
        })
    }
}
