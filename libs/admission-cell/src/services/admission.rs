// libs/admission-cell/src/services/admission.rs
use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::LedgerClient;
use shared_models::status::{BookingDomain, BookingStatus};

use crate::models::{
    Admission, AdmissionDetail, AdmissionError, AdmitPatientRequest, UpdateAdmissionRequest,
};

#[derive(Debug, Clone, Deserialize)]
struct PatientRow {
    id: i64,
    first_name: String,
    last_name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct DoctorRow {
    id: i64,
    name: String,
    department: Option<String>,
}

/// Inpatient admissions: the one domain whose lifecycle runs
/// `Admitted -> Discharged` instead of the outpatient statuses.
pub struct AdmissionService {
    ledger: Arc<LedgerClient>,
}

impl AdmissionService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            ledger: Arc::new(LedgerClient::new(config)),
        }
    }

    pub async fn admit(
        &self,
        request: AdmitPatientRequest,
        admitted_by: Option<i64>,
    ) -> Result<Admission, AdmissionError> {
        if request.ward.trim().is_empty() {
            return Err(AdmissionError::Validation("ward is required".to_string()));
        }
        if let Some(amount) = request.amount {
            if amount < 0.0 {
                return Err(AdmissionError::Validation(
                    "amount cannot be negative".to_string(),
                ));
            }
        }
        self.verify_patient_exists(request.patient_id).await?;

        let row = json!({
            "patient_id": request.patient_id,
            "doctor_id": request.doctor_id,
            "ward": request.ward,
            "room_no": request.room_no,
            "bed_no": request.bed_no,
            "admit_date": request.admit_date,
            "discharge_date": request.discharge_date,
            "diagnosis": request.diagnosis,
            "treatment": request.treatment,
            "amount": request.amount.unwrap_or(0.0),
            "status": BookingStatus::Admitted.to_string(),
            "notes": request.notes,
            "admitted_by": admitted_by,
        });

        let admission: Admission = self.ledger.insert("admissions", row).await?;
        info!(
            "Patient {} admitted to {} (admission {})",
            admission.patient_id, admission.ward, admission.id
        );
        Ok(admission)
    }

    pub async fn get(&self, admission_id: i64) -> Result<Admission, AdmissionError> {
        self.ledger
            .fetch_one("admissions", &format!("id=eq.{}", admission_id))
            .await?
            .ok_or(AdmissionError::NotFound)
    }

    pub async fn list(&self) -> Result<Vec<AdmissionDetail>, AdmissionError> {
        let admissions: Vec<Admission> = self.ledger.fetch("admissions", "order=id.desc").await?;
        self.join_names(admissions).await
    }

    pub async fn patient_admissions(
        &self,
        patient_id: i64,
    ) -> Result<Vec<AdmissionDetail>, AdmissionError> {
        let admissions: Vec<Admission> = self
            .ledger
            .fetch(
                "admissions",
                &format!("patient_id=eq.{}&order=admit_date.desc", patient_id),
            )
            .await?;
        self.join_names(admissions).await
    }

    pub async fn update(
        &self,
        admission_id: i64,
        request: UpdateAdmissionRequest,
    ) -> Result<(Admission, BookingStatus, BookingStatus), AdmissionError> {
        debug!("Updating admission: {}", admission_id);

        let current = self.get(admission_id).await?;
        let old_status = current.status;
        let new_status = request.status.unwrap_or(old_status);

        if !old_status.can_transition(BookingDomain::Admission, new_status) {
            return Err(AdmissionError::InvalidTransition {
                from: old_status,
                to: new_status,
            });
        }

        if let Some(amount) = request.amount {
            if amount < 0.0 {
                return Err(AdmissionError::Validation(
                    "amount cannot be negative".to_string(),
                ));
            }
        }

        let mut patch = Map::new();
        patch.insert("status".to_string(), json!(new_status.to_string()));
        if let Some(doctor_id) = request.doctor_id {
            patch.insert("doctor_id".to_string(), json!(doctor_id));
        }
        if let Some(ward) = request.ward {
            patch.insert("ward".to_string(), json!(ward));
        }
        if let Some(room_no) = request.room_no {
            patch.insert("room_no".to_string(), json!(room_no));
        }
        if let Some(bed_no) = request.bed_no {
            patch.insert("bed_no".to_string(), json!(bed_no));
        }
        if let Some(admit_date) = request.admit_date {
            patch.insert("admit_date".to_string(), json!(admit_date));
        }
        if let Some(discharge_date) = request.discharge_date {
            patch.insert("discharge_date".to_string(), json!(discharge_date));
        }
        if let Some(diagnosis) = request.diagnosis {
            patch.insert("diagnosis".to_string(), json!(diagnosis));
        }
        if let Some(treatment) = request.treatment {
            patch.insert("treatment".to_string(), json!(treatment));
        }
        if let Some(amount) = request.amount {
            patch.insert("amount".to_string(), json!(amount));
        }
        if let Some(notes) = request.notes {
            patch.insert("notes".to_string(), json!(notes));
        }

        let mut updated: Vec<Admission> = self
            .ledger
            .update(
                "admissions",
                &format!("id=eq.{}", admission_id),
                Value::Object(patch),
            )
            .await?;
        let admission = updated.pop().ok_or(AdmissionError::NotFound)?;

        info!(
            "Admission {} updated: {} -> {}",
            admission_id, old_status, new_status
        );
        Ok((admission, old_status, new_status))
    }

    pub async fn delete(&self, admission_id: i64) -> Result<(), AdmissionError> {
        let _ = self.get(admission_id).await?;
        self.ledger
            .delete("admissions", &format!("id=eq.{}", admission_id))
            .await?;
        info!("Admission {} deleted", admission_id);
        Ok(())
    }

    async fn verify_patient_exists(&self, patient_id: i64) -> Result<(), AdmissionError> {
        let patient: Option<PatientRow> = self
            .ledger
            .fetch_one("patients", &format!("id=eq.{}", patient_id))
            .await?;
        if patient.is_none() {
            return Err(AdmissionError::PatientNotFound);
        }
        Ok(())
    }

    async fn join_names(
        &self,
        admissions: Vec<Admission>,
    ) -> Result<Vec<AdmissionDetail>, AdmissionError> {
        let patients: Vec<PatientRow> = self.ledger.fetch("patients", "").await?;
        let doctors: Vec<DoctorRow> = self.ledger.fetch("doctors", "").await?;
        let patients: HashMap<i64, &PatientRow> = patients.iter().map(|p| (p.id, p)).collect();
        let doctors: HashMap<i64, &DoctorRow> = doctors.iter().map(|d| (d.id, d)).collect();

        Ok(admissions
            .into_iter()
            .map(|admission| {
                let patient = patients.get(&admission.patient_id);
                let doctor = admission.doctor_id.and_then(|id| doctors.get(&id));
                AdmissionDetail {
                    patient_name: patient
                        .map(|p| format!("{} {}", p.first_name, p.last_name))
                        .unwrap_or_else(|| "Unknown".to_string()),
                    doctor_name: doctor.map(|d| d.name.clone()),
                    department: doctor.and_then(|d| d.department.clone()),
                    admission,
                }
            })
            .collect())
    }
}
