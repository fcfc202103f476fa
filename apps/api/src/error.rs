//! API error types with HTTP response mapping.
//!
//! Every failure leaves the server as `{"error": "<message>", "code": "<CODE>"}`
//! with the status from [`ErrorCode::status`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};
use wheels_core::{CoreError, ValidationError};
use wheels_db::{BookingError, DbError};

/// Machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Validation,
    Unauthenticated,
    Forbidden,
    NotFound,
    Conflict,
    DuplicateEntry,
    EmptyCart,
    CartTooLarge,
    InvalidTransition,
    CannotCancel,
    StorageFailure,
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::Validation | ErrorCode::EmptyCart | ErrorCode::CartTooLarge => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict
            | ErrorCode::DuplicateEntry
            | ErrorCode::InvalidTransition
            | ErrorCode::CannotCancel => StatusCode::CONFLICT,
            ErrorCode::StorageFailure => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API-level error type that maps to HTTP responses.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthenticated, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    code: ErrorCode,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: &self.message,
            code: self.code,
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Conversions
// =============================================================================

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::Conflict { .. } => ErrorCode::Conflict,
            CoreError::DuplicateEntry { .. } => ErrorCode::DuplicateEntry,
            CoreError::EmptyCart => ErrorCode::EmptyCart,
            CoreError::CartTooLarge { .. } => ErrorCode::CartTooLarge,
            CoreError::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            CoreError::CannotCancel { .. } => ErrorCode::CannotCancel,
            CoreError::NotFound { .. } => ErrorCode::NotFound,
            CoreError::Unauthorized { .. } => ErrorCode::Forbidden,
            CoreError::Validation(_) => ErrorCode::Validation,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::new(ErrorCode::Validation, err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match &err {
            DbError::NotFound { entity, .. } => ApiError::not_found(format!("{entity} not found")),
            DbError::UniqueViolation { .. } => {
                ApiError::new(ErrorCode::DuplicateEntry, err.to_string())
            }
            DbError::ForeignKeyViolation { .. } => {
                ApiError::conflict("Record is still referenced by other data")
            }
            DbError::CheckViolation { .. } => ApiError::new(ErrorCode::Validation, err.to_string()),
            DbError::MigrationFailed(_) | DbError::Internal(_) => {
                error!(error = %err, "Internal storage error");
                ApiError::internal("Internal server error")
            }
            _ => {
                if err.is_transient() {
                    warn!(error = %err, "Transient storage failure");
                } else {
                    error!(error = %err, "Storage failure");
                }
                ApiError::new(ErrorCode::StorageFailure, "Storage temporarily unavailable")
            }
        }
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Core(core) => core.into(),
            BookingError::Storage(db) => {
                warn!(error = %db, "Booking rolled back");
                ApiError::new(ErrorCode::StorageFailure, "Storage temporarily unavailable")
            }
        }
    }
}
