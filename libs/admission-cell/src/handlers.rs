// libs/admission-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::AuthContext;
use shared_models::error::AppError;

use crate::models::{AdmitPatientRequest, UpdateAdmissionRequest};
use crate::services::admission::AdmissionService;

#[axum::debug_handler]
pub async fn admit_patient(
    State(state): State<Arc<AppConfig>>,
    Extension(ctx): Extension<AuthContext>,
    Json(request): Json<AdmitPatientRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = AdmissionService::new(&state);
    let admitted_by = ctx.user_id.parse::<i64>().ok();
    let admission = service.admit(request, admitted_by).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Patient admitted",
            "id": admission.id
        })),
    ))
}

#[axum::debug_handler]
pub async fn list_admissions(
    State(state): State<Arc<AppConfig>>,
    Extension(_ctx): Extension<AuthContext>,
) -> Result<Json<Value>, AppError> {
    let service = AdmissionService::new(&state);
    let admissions = service.list().await?;
    Ok(Json(json!(admissions)))
}

#[axum::debug_handler]
pub async fn get_admission(
    State(state): State<Arc<AppConfig>>,
    Extension(_ctx): Extension<AuthContext>,
    Path(admission_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = AdmissionService::new(&state);
    let admission = service.get(admission_id).await?;
    Ok(Json(json!(admission)))
}

#[axum::debug_handler]
pub async fn update_admission(
    State(state): State<Arc<AppConfig>>,
    Extension(_ctx): Extension<AuthContext>,
    Path(admission_id): Path<i64>,
    Json(request): Json<UpdateAdmissionRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AdmissionService::new(&state);
    let (_, old_status, new_status) = service.update(admission_id, request).await?;

    Ok(Json(json!({
        "message": "Admission updated",
        "old_status": old_status,
        "new_status": new_status
    })))
}

#[axum::debug_handler]
pub async fn delete_admission(
    State(state): State<Arc<AppConfig>>,
    Extension(_ctx): Extension<AuthContext>,
    Path(admission_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = AdmissionService::new(&state);
    service.delete(admission_id).await?;
    Ok(Json(json!({ "message": "Admission record deleted" })))
}

#[axum::debug_handler]
pub async fn patient_admissions(
    State(state): State<Arc<AppConfig>>,
    Extension(_ctx): Extension<AuthContext>,
    Path(patient_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = AdmissionService::new(&state);
    let admissions = service.patient_admissions(patient_id).await?;
    Ok(Json(json!(admissions)))
}
