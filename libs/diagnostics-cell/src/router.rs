// libs/diagnostics-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// Walk-in bookings are public; managing them is a staff action.
pub fn lab_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new().route(
        "/bookings",
        post(handlers::create_lab_booking).get(handlers::list_lab_bookings),
    );

    let protected_routes = Router::new()
        .route("/bookings/{booking_id}", put(handlers::update_lab_booking))
        .route(
            "/bookings/{booking_id}",
            delete(handlers::delete_lab_booking),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

pub fn radiology_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new().route(
        "/bookings",
        post(handlers::create_radiology_booking).get(handlers::list_radiology_bookings),
    );

    let protected_routes = Router::new()
        .route(
            "/bookings/{booking_id}",
            put(handlers::update_radiology_booking),
        )
        .route(
            "/bookings/{booking_id}",
            delete(handlers::delete_radiology_booking),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
