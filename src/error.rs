use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Errors surfaced by the credential store and authenticator.
///
/// Store driver errors are mapped into these variants before they leave
/// `users::services`; nothing below this type reaches a client.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("all fields are required")]
    MissingFields,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("{0}")]
    Validation(String),

    #[error("email already registered")]
    DuplicateEmail,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthorized(String),

    #[error("user not found")]
    NotFound,

    #[error("store unavailable")]
    StoreUnavailable,

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingFields | AppError::PasswordMismatch | AppError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::MissingFields | AppError::PasswordMismatch | AppError::Validation(_) => {
                "VALIDATION_FAILED"
            }
            AppError::DuplicateEmail => "DUPLICATE_EMAIL",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::NotFound => "NOT_FOUND",
            AppError::StoreUnavailable => "STORE_UNAVAILABLE",
            AppError::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(ref e) = self {
            error!(error = ?e, "internal error");
        }
        let status = self.status();
        let body = Json(ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                // Display of Internal is generic, the cause stays in the log
                message: self.to_string(),
            },
        });
        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
