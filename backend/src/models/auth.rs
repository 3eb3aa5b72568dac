//! Authenticated caller context and auth request/response payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;
use crate::models::user::{normalize_username, UserResponse, ADMIN_ROLE};
use crate::types::UserId;
use crate::utils::jwt::Claims;

pub const TOKEN_TYPE: &str = "Bearer";

/// Identity of the caller, derived once from verified claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: UserId,
    pub username: String,
    pub role: String,
    pub is_admin: bool,
}

impl AuthContext {
    pub fn from_claims(claims: &Claims, admin_role_label: &str) -> Result<Self, AppError> {
        Ok(AuthContext {
            user_id: current_user_id(claims)?,
            username: current_username(claims)?,
            role: claims.role.trim().to_string(),
            is_admin: is_admin_role(&claims.role, admin_role_label),
        })
    }

    /// Course owners and admins may modify a course.
    pub fn can_modify(&self, owner_username: Option<&str>) -> bool {
        self.is_admin || owner_username == Some(self.username.as_str())
    }
}

pub fn current_user_id(claims: &Claims) -> Result<UserId, AppError> {
    let sub = claims.sub.trim();
    if sub.is_empty() {
        return Err(AppError::MalformedToken);
    }
    sub.parse::<UserId>().map_err(|_| AppError::MalformedToken)
}

pub fn current_username(claims: &Claims) -> Result<String, AppError> {
    let username = normalize_username(&claims.username);
    if username.is_empty() {
        return Err(AppError::MalformedToken);
    }
    Ok(username)
}

/// `admin` in any case, or the configured localized admin label verbatim.
pub fn is_admin_role(role: &str, admin_role_label: &str) -> bool {
    let role = role.trim();
    role.eq_ignore_ascii_case(ADMIN_ROLE) || (!role.is_empty() && role == admin_role_label)
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "username and password are required"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "username and password are required"))]
    pub password: String,
}

impl LoginRequest {
    pub fn normalized(self) -> Self {
        Self {
            username: normalize_username(&self.username),
            password: self.password.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogoutRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Insert payload for a refresh-token row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRefreshToken {
    pub user_id: UserId,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

/// Tokens handed out by a successful login or refresh.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub token_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
}

impl AuthResponse {
    pub fn message(message: impl Into<String>) -> Self {
        AuthResponse {
            message: message.into(),
            token: None,
            refresh_token: None,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: None,
            user: None,
        }
    }

    pub fn with_user(message: impl Into<String>, user: UserResponse) -> Self {
        AuthResponse {
            user: Some(user),
            ..Self::message(message)
        }
    }

    pub fn with_session(message: impl Into<String>, session: SessionTokens) -> Self {
        AuthResponse {
            token: Some(session.access_token),
            refresh_token: Some(session.refresh_token),
            expires_in: Some(session.expires_in),
            user: Some(session.user),
            ..Self::message(message)
        }
    }
}
