use axum::{
    extract::{Extension, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::AppError,
    models::{
        auth::AuthContext,
        user::{ChangePasswordRequest, UpdateProfileNameRequest},
    },
    state::AppState,
};

pub async fn update_profile_name(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Json(payload): Json<UpdateProfileNameRequest>,
) -> Result<Json<Value>, AppError> {
    let user = state
        .accounts
        .update_own_name(caller.user_id, &payload.name)
        .await?;
    Ok(Json(json!({ "message": "profile updated", "user": user })))
}

/// Every refresh token of the caller is revoked on success.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<Value>, AppError> {
    state
        .accounts
        .change_password(
            caller.user_id,
            &payload.current_password,
            &payload.new_password,
        )
        .await?;
    Ok(Json(json!({ "message": "password changed" })))
}
