use std::sync::Arc;

use axum::{routing::get, Router};

use admission_cell::router::admission_routes;
use appointment_cell::router::appointment_routes;
use billing_cell::router::{report_routes, stats_routes};
use diagnostics_cell::router::{lab_routes, radiology_routes};
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "MediCare Plus front-desk API is running!" }))
        .nest("/bookings", appointment_routes(state.clone()))
        .nest("/lab", lab_routes(state.clone()))
        .nest("/radiology", radiology_routes(state.clone()))
        .nest("/admissions", admission_routes(state.clone()))
        .nest("/reports", report_routes(state.clone()))
        .nest("/stats", stats_routes(state))
}
