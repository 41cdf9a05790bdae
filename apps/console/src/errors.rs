use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::backend::BackendError;
use crate::models::remark::UnknownStatus;

/// Local, synchronous input errors. Always raised before any backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("date is required when time is set")]
    ReminderDateRequired,

    #[error("{field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },

    #[error("{0}")]
    UnknownStatus(#[from] UnknownStatus),

    #[error("date range start {from} is after end {to}")]
    InvalidDateRange { from: String, to: String },
}

impl ValidationError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field,
            message: message.into(),
        }
    }

    /// The request field the error should be shown next to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField(field) => *field,
            ValidationError::ReminderDateRequired => "reminderDate",
            ValidationError::InvalidValue { field, .. } => *field,
            ValidationError::UnknownStatus(_) => "status",
            ValidationError::InvalidDateRange { .. } => "from",
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Transport error: {0}")]
    Transport(BackendError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound(what) => AppError::NotFound(what),
            other => AppError::Transport(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, field) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::Validation(e) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                e.to_string(),
                Some(e.field()),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone(), None),
            AppError::Transport(e) => {
                tracing::error!("Backend error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "TRANSPORT_ERROR",
                    "The CRM backend could not complete the request".to_string(),
                    None,
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
                "field": field
            }
        }));

        (status, body).into_response()
    }
}
