//! Common validation rules shared across request payloads.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use validator::ValidationError;

use crate::error::AppError;
use crate::models::course::CourseStatus;
use crate::models::user::{is_known_role, UserStatus};

pub const MIN_PASSWORD_CHARS: usize = 8;
pub const EMPLOYEE_CODE_MESSAGE: &str = "employee_code must be in format 2026-XX-XXXX";

static EMPLOYEE_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^2026-[A-Z0-9]{2}-[0-9]{4}$")
        .unwrap_or_else(|err| panic!("employee code pattern: {err}"))
});

/// Validates password length.
///
/// Requirements:
/// - Present
/// - At least 8 characters (counted as chars, not bytes)
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::new("password_required")
            .with_message(Cow::Borrowed("password is required")));
    }
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ValidationError::new("password_too_short")
            .with_message(Cow::Borrowed("password must be at least 8 characters")));
    }
    Ok(())
}

pub fn validate_role(role: &str) -> Result<(), ValidationError> {
    if is_known_role(role) {
        Ok(())
    } else {
        Err(ValidationError::new("role_invalid").with_message(Cow::Borrowed("role is invalid")))
    }
}

pub fn validate_status(status: &str) -> Result<(), ValidationError> {
    match UserStatus::parse(status) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("status_invalid")
            .with_message(Cow::Borrowed("status must be active or inactive"))),
    }
}

/// Matches an already normalized (trimmed, upper-cased) employee code.
pub fn is_valid_employee_code(code: &str) -> bool {
    EMPLOYEE_CODE.is_match(code)
}

/// Checks the code format. An empty code is left to the required-field rule.
pub fn validate_employee_code(code: &str) -> Result<(), ValidationError> {
    if code.is_empty() || is_valid_employee_code(code) {
        Ok(())
    } else {
        Err(ValidationError::new("employee_code_invalid")
            .with_message(Cow::Borrowed(EMPLOYEE_CODE_MESSAGE)))
    }
}

pub fn validate_course_status(status: &str) -> Result<(), ValidationError> {
    match CourseStatus::parse(status) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("course_status_invalid")
            .with_message(Cow::Borrowed("status must be active, inprogress or inactive"))),
    }
}

/// Applies [`validate_password`] outside of a derived payload.
pub fn ensure_password(password: &str) -> Result<(), AppError> {
    validate_password(password).map_err(|err| {
        AppError::Validation(vec![err
            .message
            .map(|m| m.to_string())
            .unwrap_or_else(|| err.code.to_string())])
    })
}
