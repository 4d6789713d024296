// libs/admission-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// Every admission operation is a staff action.
pub fn admission_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route(
            "/",
            post(handlers::admit_patient).get(handlers::list_admissions),
        )
        .route("/{admission_id}", get(handlers::get_admission))
        .route("/{admission_id}", put(handlers::update_admission))
        .route("/{admission_id}", delete(handlers::delete_admission))
        .route(
            "/patients/{patient_id}",
            get(handlers::patient_admissions),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
