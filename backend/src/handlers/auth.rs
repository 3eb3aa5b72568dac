use axum::{
    body::Bytes,
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        auth::{AuthContext, AuthResponse, LoginRequest, LogoutRequest, RefreshRequest},
        user::{RegisterRequest, UserResponse},
    },
    state::AppState,
};

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let payload = payload.normalized();
    payload.validate()?;

    let user = state
        .accounts
        .register(&payload.name, &payload.username, &payload.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::with_user("register success", user)),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let payload = payload.normalized();
    payload.validate()?;

    let session = state
        .sessions
        .login(&payload.username, &payload.password)
        .await?;
    Ok(Json(AuthResponse::with_session("login success", session)))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let raw = payload.refresh_token.trim();
    if raw.is_empty() {
        return Err(AppError::BadRequest("refresh_token is required".into()));
    }

    let session = state.sessions.refresh(raw).await?;
    Ok(Json(AuthResponse::with_session("refresh success", session)))
}

/// Accepts an empty body; logging out without a token is a no-op.
pub async fn logout(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AuthResponse>, AppError> {
    let payload = if body.iter().all(u8::is_ascii_whitespace) {
        LogoutRequest::default()
    } else {
        serde_json::from_slice::<LogoutRequest>(&body)
            .map_err(|_| AppError::BadRequest("invalid request body".into()))?
    };

    state
        .sessions
        .logout(payload.refresh_token.as_deref())
        .await?;
    Ok(Json(AuthResponse::message("logout success")))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
) -> Result<Json<UserResponse>, AppError> {
    // A valid token for a deleted account is a dead session.
    let user = state
        .accounts
        .profile(caller.user_id)
        .await
        .map_err(|err| match err {
            AppError::NotFound(_) => AppError::Unauthorized("invalid token".into()),
            other => other,
        })?;
    Ok(Json(user))
}
