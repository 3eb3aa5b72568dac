use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Every failure a core operation or handler can produce.
///
/// Credential and refresh-token failures deliberately carry no detail so that
/// an unknown username and a wrong password (or an unknown, rotated and expired
/// refresh token) are indistinguishable to the client.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("validation failed: {0:?}")]
    Validation(Vec<String>),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid refresh token")]
    InvalidRefreshToken,
    #[error("{0}")]
    Unauthorized(String),
    #[error("malformed token claims")]
    MalformedToken,
    #[error("user is inactive")]
    AccountInactive,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
    #[error("signing error: {0}")]
    Signing(String),
    #[error("randomness error: {0}")]
    Randomness(String),
    #[error("hashing error: {0}")]
    Hashing(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials
            | AppError::InvalidRefreshToken
            | AppError::Unauthorized(_)
            | AppError::MalformedToken => StatusCode::UNAUTHORIZED,
            AppError::AccountInactive | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Storage(_)
            | AppError::Signing(_)
            | AppError::Randomness(_)
            | AppError::Hashing(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.status() == StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_message, code, details) = match self {
            AppError::BadRequest(msg) => (msg, "BAD_REQUEST", None),
            AppError::Validation(errors) => (
                "Validation failed".to_string(),
                "VALIDATION_ERROR",
                Some(serde_json::json!({ "errors": errors })),
            ),
            AppError::InvalidCredentials => {
                ("invalid credentials".to_string(), "INVALID_CREDENTIALS", None)
            }
            AppError::InvalidRefreshToken => (
                "invalid refresh token".to_string(),
                "INVALID_REFRESH_TOKEN",
                None,
            ),
            AppError::Unauthorized(msg) => (msg, "UNAUTHORIZED", None),
            AppError::MalformedToken => ("invalid token".to_string(), "UNAUTHORIZED", None),
            AppError::AccountInactive => {
                ("user is inactive".to_string(), "ACCOUNT_INACTIVE", None)
            }
            AppError::Forbidden(msg) => (msg, "FORBIDDEN", None),
            AppError::NotFound(msg) => (msg, "NOT_FOUND", None),
            AppError::Conflict(msg) => (msg, "CONFLICT", None),
            internal => {
                tracing::error!(error = %internal, "Internal server error");
                (
                    "Internal server error".to_string(),
                    "INTERNAL_SERVER_ERROR",
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
            code: code.to_string(),
            details,
        });

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{}: {}", field, e.code),
                })
            })
            .collect();
        messages.sort();
        AppError::Validation(messages)
    }
}
