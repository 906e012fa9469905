use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

/// Per-field validation message, collected into the 422 payload
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    pub message: String,
}

impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or too-short input; carries per-field messages
    #[error("{message}")]
    Validation {
        message: String,
        errors: Vec<FieldError>,
    },

    /// No credential, invalid credential, or failed password check
    #[error("{0}")]
    Unauthenticated(String),

    /// Authenticated but not the resource owner
    #[error("Not authorized!")]
    Forbidden,

    /// Referenced entity absent
    #[error("{0}")]
    NotFound(String),

    /// Duplicate unique key
    #[error("{0}")]
    Conflict(String),

    /// Unexpected storage/runtime fault; diagnostic stays server-side
    #[error("An unknown error has occurred.")]
    Internal(String),
}

pub type Result<T> = core::result::Result<T, ApiError>;

impl ApiError {
    pub fn validation(errors: Vec<FieldError>) -> Self {
        ApiError::Validation {
            message: "Validation failed, entered data is incorrect.".to_string(),
            errors,
        }
    }

    pub fn unauthenticated() -> Self {
        ApiError::Unauthenticated("Not authenticated.".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // The original diagnostic never leaves the process.
        if let ApiError::Internal(detail) = &self {
            error!("internal error: {}", detail);
        }

        let mut body = json!({
            "message": self.to_string(),
            "status": status.as_u16(),
        });
        if let ApiError::Validation { errors, .. } = &self {
            body["data"] = json!(errors);
        }

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for ApiError {
    fn from(err: bcrypt::BcryptError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}
