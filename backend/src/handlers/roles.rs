use axum::Json;
use serde::Serialize;

use crate::models::user::{UserStatus, DEFAULT_ROLE_LABEL, ROLE_OPTIONS};

#[derive(Debug, Serialize)]
pub struct RoleOptionsResponse {
    pub roles: Vec<&'static str>,
    pub default_role: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UserOptionsResponse {
    pub role_options: Vec<&'static str>,
    pub status_options: Vec<&'static str>,
    pub default_role: &'static str,
    pub default_status: &'static str,
}

pub async fn role_options() -> Json<RoleOptionsResponse> {
    Json(RoleOptionsResponse {
        roles: ROLE_OPTIONS.to_vec(),
        default_role: DEFAULT_ROLE_LABEL,
    })
}

pub async fn user_options() -> Json<UserOptionsResponse> {
    Json(UserOptionsResponse {
        role_options: ROLE_OPTIONS.to_vec(),
        status_options: UserStatus::OPTIONS.to_vec(),
        default_role: DEFAULT_ROLE_LABEL,
        default_status: UserStatus::Active.as_str(),
    })
}
