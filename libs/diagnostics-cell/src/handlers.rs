// libs/diagnostics-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Map, Value};

use notification_cell::NotificationDispatcher;
use shared_config::AppConfig;
use shared_models::auth::AuthContext;
use shared_models::error::AppError;

use crate::models::{
    CreateLabBookingRequest, CreateRadiologyBookingRequest, LabBooking, RadiologyBooking,
    UpdateServiceBookingRequest,
};
use crate::services::booking::AncillaryBookingService;

const DEFAULT_BOOKING_TIME: &str = "09:00";

// ==============================================================================
// LAB BOOKINGS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_lab_booking(
    State(state): State<Arc<AppConfig>>,
    Extension(notifier): Extension<Arc<NotificationDispatcher>>,
    Json(request): Json<CreateLabBookingRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let mut row = Map::new();
    row.insert("patient_name".to_string(), json!(request.patient_name));
    row.insert(
        "patient_contact".to_string(),
        json!(request.patient_contact),
    );
    row.insert("patient_email".to_string(), json!(request.patient_email));
    row.insert("test_id".to_string(), json!(request.test_id));
    row.insert("test_name".to_string(), json!(request.test_name));
    row.insert("booking_date".to_string(), json!(request.booking_date));
    row.insert(
        "booking_time".to_string(),
        json!(request
            .booking_time
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_else(|| DEFAULT_BOOKING_TIME.to_string())),
    );
    row.insert("notes".to_string(), json!(request.notes));
    row.insert("amount".to_string(), json!(request.amount.unwrap_or(0.0)));

    let service = AncillaryBookingService::<LabBooking>::new(&state, notifier);
    let booking = service.create(row).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Lab booking confirmed",
            "id": booking.id
        })),
    ))
}

#[axum::debug_handler]
pub async fn list_lab_bookings(
    State(state): State<Arc<AppConfig>>,
    Extension(notifier): Extension<Arc<NotificationDispatcher>>,
) -> Result<Json<Value>, AppError> {
    let service = AncillaryBookingService::<LabBooking>::new(&state, notifier);
    let bookings = service.list().await?;
    Ok(Json(json!(bookings)))
}

#[axum::debug_handler]
pub async fn update_lab_booking(
    State(state): State<Arc<AppConfig>>,
    Extension(notifier): Extension<Arc<NotificationDispatcher>>,
    Extension(_ctx): Extension<AuthContext>,
    Path(booking_id): Path<i64>,
    Json(request): Json<UpdateServiceBookingRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AncillaryBookingService::<LabBooking>::new(&state, notifier);
    let (_, old_status, new_status) = service.update(booking_id, request).await?;

    Ok(Json(json!({
        "message": "Booking updated",
        "old_status": old_status,
        "new_status": new_status
    })))
}

#[axum::debug_handler]
pub async fn delete_lab_booking(
    State(state): State<Arc<AppConfig>>,
    Extension(notifier): Extension<Arc<NotificationDispatcher>>,
    Extension(_ctx): Extension<AuthContext>,
    Path(booking_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = AncillaryBookingService::<LabBooking>::new(&state, notifier);
    service.delete(booking_id).await?;
    Ok(Json(json!({ "message": "Booking deleted" })))
}

// ==============================================================================
// RADIOLOGY BOOKINGS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_radiology_booking(
    State(state): State<Arc<AppConfig>>,
    Extension(notifier): Extension<Arc<NotificationDispatcher>>,
    Json(request): Json<CreateRadiologyBookingRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let mut row = Map::new();
    row.insert("patient_name".to_string(), json!(request.patient_name));
    row.insert(
        "patient_contact".to_string(),
        json!(request.patient_contact),
    );
    row.insert("patient_email".to_string(), json!(request.patient_email));
    row.insert("service_id".to_string(), json!(request.service_id));
    row.insert("service_name".to_string(), json!(request.service_name));
    row.insert("booking_date".to_string(), json!(request.booking_date));
    row.insert(
        "booking_time".to_string(),
        json!(request
            .booking_time
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_else(|| DEFAULT_BOOKING_TIME.to_string())),
    );
    row.insert("notes".to_string(), json!(request.notes));
    row.insert("amount".to_string(), json!(request.amount.unwrap_or(0.0)));

    let service = AncillaryBookingService::<RadiologyBooking>::new(&state, notifier);
    let booking = service.create(row).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Radiology booking confirmed",
            "id": booking.id
        })),
    ))
}

#[axum::debug_handler]
pub async fn list_radiology_bookings(
    State(state): State<Arc<AppConfig>>,
    Extension(notifier): Extension<Arc<NotificationDispatcher>>,
) -> Result<Json<Value>, AppError> {
    let service = AncillaryBookingService::<RadiologyBooking>::new(&state, notifier);
    let bookings = service.list().await?;
    Ok(Json(json!(bookings)))
}

#[axum::debug_handler]
pub async fn update_radiology_booking(
    State(state): State<Arc<AppConfig>>,
    Extension(notifier): Extension<Arc<NotificationDispatcher>>,
    Extension(_ctx): Extension<AuthContext>,
    Path(booking_id): Path<i64>,
    Json(request): Json<UpdateServiceBookingRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AncillaryBookingService::<RadiologyBooking>::new(&state, notifier);
    let (_, old_status, new_status) = service.update(booking_id, request).await?;

    Ok(Json(json!({
        "message": "Booking updated",
        "old_status": old_status,
        "new_status": new_status
    })))
}

#[axum::debug_handler]
pub async fn delete_radiology_booking(
    State(state): State<Arc<AppConfig>>,
    Extension(notifier): Extension<Arc<NotificationDispatcher>>,
    Extension(_ctx): Extension<AuthContext>,
    Path(booking_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = AncillaryBookingService::<RadiologyBooking>::new(&state, notifier);
    service.delete(booking_id).await?;
    Ok(Json(json!({ "message": "Booking deleted" })))
}
