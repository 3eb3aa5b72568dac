//! Models that represent users, account payloads, and role metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use validator::Validate;

use crate::types::UserId;
use crate::validation::rules;

/// Role assigned by self-registration.
pub const REGISTERED_ROLE: &str = "user";
/// Role assigned to the bootstrap administrator.
pub const ADMIN_ROLE: &str = "admin";
/// Role applied when an administrator creates a user without one.
pub const DEFAULT_ROLE_LABEL: &str = "ผู้ใช้งาน";
/// Roles an administrator may assign.
pub const ROLE_OPTIONS: [&str; 5] = ["ผู้ใช้งาน", "ผู้สอน", "ผู้ดูแลระบบ", "user", "admin"];

#[derive(Debug, Clone, FromRow)]
/// Database representation of a user account.
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Lower-cased, trimmed login name.
    pub username: String,
    /// Argon2 PHC string. Never leaves the server.
    pub password_hash: String,
    pub role: String,
    #[sqlx(try_from = "String")]
    pub status: UserStatus,
    /// Upper-cased staff code. Empty for self-registered accounts.
    pub employee_code: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

impl UserStatus {
    pub const OPTIONS: [&'static str; 2] = ["active", "inactive"];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
        }
    }

    /// Parses a status after trimming and lower-casing it.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "active" => Some(UserStatus::Active),
            "inactive" => Some(UserStatus::Inactive),
            _ => None,
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for UserStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        UserStatus::parse(&value).ok_or_else(|| format!("unknown user status: {value}"))
    }
}

/// Trims and lower-cases a username so lookups are case-insensitive.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Trims and upper-cases an employee code.
pub fn normalize_employee_code(code: &str) -> String {
    code.trim().to_uppercase()
}

pub fn is_known_role(role: &str) -> bool {
    ROLE_OPTIONS.contains(&role)
}

/// Fields required to insert a user row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub status: UserStatus,
    pub employee_code: String,
}

/// Partial update applied by an administrator. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub role: Option<String>,
    pub status: Option<UserStatus>,
    pub employee_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Public-facing representation of a user returned by the API.
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub role: String,
    pub status: UserStatus,
    pub employee_code: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            name: user.name,
            username: user.username,
            role: user.role,
            status: user.status,
            employee_code: user.employee_code,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "name, username and password are required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "name, username and password are required"))]
    pub username: String,
    #[serde(default)]
    #[validate(custom(function = "rules::validate_password"))]
    pub password: String,
}

impl RegisterRequest {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            username: normalize_username(&self.username),
            password: self.password.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AdminCreateUserRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "name, username and password are required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "name, username and password are required"))]
    pub username: String,
    #[serde(default)]
    #[validate(
        length(min = 1, message = "name, username, employee_code and password are required"),
        custom(function = "rules::validate_employee_code")
    )]
    pub employee_code: String,
    #[serde(default)]
    #[validate(custom(function = "rules::validate_password"))]
    pub password: String,
    #[serde(default)]
    #[validate(custom(function = "rules::validate_role"))]
    pub role: String,
    #[serde(default)]
    #[validate(custom(function = "rules::validate_status"))]
    pub status: String,
}

impl AdminCreateUserRequest {
    /// Trims every field and fills in the default role and status.
    pub fn normalized(self) -> Self {
        let role = self.role.trim();
        let status = self.status.trim().to_lowercase();
        Self {
            name: self.name.trim().to_string(),
            username: normalize_username(&self.username),
            employee_code: normalize_employee_code(&self.employee_code),
            password: self.password.trim().to_string(),
            role: if role.is_empty() {
                DEFAULT_ROLE_LABEL.to_string()
            } else {
                role.to_string()
            },
            status: if status.is_empty() {
                UserStatus::Active.as_str().to_string()
            } else {
                status
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminUpdateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub status: String,
    /// Empty keeps the stored code.
    #[serde(default)]
    pub employee_code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminResetPasswordRequest {
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfileNameRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
/// Payload submitted when a user changes their own password.
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}
