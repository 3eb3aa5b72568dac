use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{
    config::Config, error::AppError, models::auth::AuthContext, state::AppState,
    utils::jwt::verify_access_token,
};

/// Requires a valid bearer token and exposes the caller as `Extension<AuthContext>`.
pub async fn auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let context = authenticate_request(request.headers(), &state.config)?;
    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

// Auth + require admin role for admin-only routes
pub async fn auth_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let context = authenticate_request(request.headers(), &state.config)?;
    if !context.is_admin {
        tracing::warn!(user_id = %context.user_id, role = %context.role, "Rejected non-admin caller");
        return Err(AppError::Forbidden("admin only".into()));
    }
    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

fn authenticate_request(headers: &HeaderMap, config: &Config) -> Result<AuthContext, AppError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_bearer_token)
        .ok_or_else(|| AppError::Unauthorized("missing or malformed bearer token".into()))?;

    let claims = verify_access_token(token, &config.jwt_secret)?;
    AuthContext::from_claims(&claims, &config.admin_role_label)
}

fn parse_bearer_token(header: &str) -> Option<&str> {
    let (scheme, rest) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    (!token.is_empty()).then_some(token)
}
