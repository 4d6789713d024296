use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::jwt::validate_token;

/// Middleware for routes that require an authenticated session.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let ctx = validate_token(&token, &config.session_jwt_secret).map_err(AppError::Auth)?;

    request.extensions_mut().insert(ctx);

    Ok(next.run(request).await)
}

/// Middleware for routes that behave differently when a session is present
/// but never reject anonymous callers (e.g. the dashboard stats view, which
/// scopes itself to a doctor's own bookings when one is logged in).
pub async fn optional_auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(&request) {
        if let Ok(ctx) = validate_token(&token, &config.session_jwt_secret) {
            request.extensions_mut().insert(ctx);
        }
    }

    next.run(request).await
}

fn bearer_token(request: &Request<Body>) -> Option<String> {
    let auth_value = request.headers().get("Authorization")?.to_str().ok()?;
    auth_value
        .strip_prefix("Bearer ")
        .map(|token| token.to_string())
}
