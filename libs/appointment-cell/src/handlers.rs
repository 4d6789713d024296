// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use notification_cell::NotificationDispatcher;
use shared_config::AppConfig;
use shared_models::auth::AuthContext;
use shared_models::error::AppError;

use crate::models::{
    AppointmentListQuery, BookAppointmentRequest, RescheduleAppointmentRequest, SlotQuery,
    UpdateAppointmentRequest,
};
use crate::services::booking::AppointmentBookingService;
use crate::services::slots::SlotAllocator;

/// Public booking request — walk-ins and the patient portal book without a
/// session; the contest for the slot happens at confirmation.
#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(notifier): Extension<Arc<NotificationDispatcher>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = AppointmentBookingService::new(&state, notifier);
    let appointment = service.create(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Appointment booked",
            "id": appointment.id
        })),
    ))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(notifier): Extension<Arc<NotificationDispatcher>>,
    ctx: Option<Extension<AuthContext>>,
    Query(mut query): Query<AppointmentListQuery>,
) -> Result<Json<Value>, AppError> {
    // doctor sessions only ever see their own bookings
    if let Some(Extension(ctx)) = ctx {
        if let Some(doctor_id) = ctx.doctor_scope() {
            query.doctor_id = Some(doctor_id);
        }
    }

    let service = AppointmentBookingService::new(&state, notifier);
    let appointments = service.list(query).await?;
    Ok(Json(json!(appointments)))
}

#[axum::debug_handler]
pub async fn available_slots(
    State(state): State<Arc<AppConfig>>,
    Extension(notifier): Extension<Arc<NotificationDispatcher>>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&state, notifier);
    let allocator = SlotAllocator::new(service.ledger());
    let slots = allocator
        .available_slots(query.doctor_id, query.date)
        .await?;
    Ok(Json(json!(slots)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(notifier): Extension<Arc<NotificationDispatcher>>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&state, notifier);
    let detail = service.get_detail(appointment_id).await?;
    Ok(Json(json!(detail)))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(notifier): Extension<Arc<NotificationDispatcher>>,
    Extension(_ctx): Extension<AuthContext>,
    Path(appointment_id): Path<i64>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&state, notifier);
    let (_, old_status, new_status) = service.update(appointment_id, request).await?;

    Ok(Json(json!({
        "message": "Appointment updated",
        "old_status": old_status,
        "new_status": new_status
    })))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(notifier): Extension<Arc<NotificationDispatcher>>,
    Extension(_ctx): Extension<AuthContext>,
    Path(appointment_id): Path<i64>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&state, notifier);
    let appointment = service.reschedule(appointment_id, request).await?;

    Ok(Json(json!({
        "message": "Appointment rescheduled",
        "new_date": appointment.appointment_date,
        "new_time": appointment.appointment_time.format("%H:%M").to_string()
    })))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(notifier): Extension<Arc<NotificationDispatcher>>,
    Extension(_ctx): Extension<AuthContext>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&state, notifier);
    service.delete(appointment_id).await?;
    Ok(Json(json!({ "message": "Appointment deleted" })))
}
