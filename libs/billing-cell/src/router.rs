// libs/billing-cell/src/router.rs
use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use shared_config::AppConfig;
use shared_utils::extractor::optional_auth_middleware;

use crate::handlers;

pub fn report_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/financial", get(handlers::financial_report))
        .with_state(state)
}

pub fn stats_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard_stats))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ))
        .with_state(state)
}
