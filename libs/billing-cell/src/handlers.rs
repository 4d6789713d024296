// libs/billing-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::AuthContext;
use shared_models::error::AppError;

use crate::models::StatsQuery;
use crate::services::reconcile::ReconciliationService;
use crate::services::stats::StatsService;

#[axum::debug_handler]
pub async fn financial_report(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = ReconciliationService::new(&state);
    let report = service.financial_report().await?;
    Ok(Json(json!(report)))
}

#[axum::debug_handler]
pub async fn dashboard_stats(
    State(state): State<Arc<AppConfig>>,
    ctx: Option<Extension<AuthContext>>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<Value>, AppError> {
    // a doctor session always sees their own workload, whatever the query says
    let scope = match ctx.as_ref().and_then(|ext| ext.0.doctor_scope()) {
        Some(doctor_id) => Some(doctor_id),
        None => query.scope,
    };

    let service = StatsService::new(&state);
    let stats = service.dashboard_stats(scope).await?;
    Ok(Json(json!(stats)))
}
