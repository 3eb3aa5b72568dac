use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::{
    error::AppError,
    models::user::{
        normalize_username, AdminCreateUserRequest, AdminResetPasswordRequest,
        AdminUpdateUserRequest, UserStatus,
    },
    services::NewAccount,
    state::AppState,
};

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let users = state.accounts.list_users().await?;
    Ok(Json(json!({ "users": users })))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<AdminCreateUserRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let payload = payload.normalized();
    payload.validate()?;

    let status = UserStatus::parse(&payload.status).unwrap_or_default();
    let user = state
        .accounts
        .create_user(NewAccount {
            name: payload.name,
            username: payload.username,
            password: payload.password,
            role: payload.role,
            status,
            employee_code: payload.employee_code,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "create user success", "user": user })),
    ))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(payload): Json<AdminUpdateUserRequest>,
) -> Result<Json<Value>, AppError> {
    let username = required_username(&username)?;
    let user = state.accounts.update_user(&username, payload).await?;
    Ok(Json(json!({ "message": "update user success", "user": user })))
}

pub async fn reset_user_password(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(payload): Json<AdminResetPasswordRequest>,
) -> Result<Json<Value>, AppError> {
    let username = required_username(&username)?;
    state
        .accounts
        .reset_password(&username, &payload.new_password)
        .await?;
    Ok(Json(json!({ "message": "reset password success" })))
}

fn required_username(raw: &str) -> Result<String, AppError> {
    let username = normalize_username(raw);
    if username.is_empty() {
        return Err(AppError::BadRequest("username is required".into()));
    }
    Ok(username)
}
