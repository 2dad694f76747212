//! Error types for Booklend server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Numeric error codes carried in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    NotAuthenticated = 2,
    StorageUnavailable = 3,
    NoSuchItem = 5,
    NoSuchLoan = 6,
    OutOfStock = 7,
    DuplicateReservation = 8,
    VerificationFailed = 9,
    LimitReached = 11,
    NotOwned = 12,
    EmptyRequest = 14,
    BadValue = 18,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Item with id {0} not found")]
    ItemNotFound(i32),

    #[error("Loan with id {0} not found")]
    LoanNotFound(i32),

    #[error("Limit reached: you can only have {limit} active loans at a time")]
    LimitReached { limit: u32 },

    #[error("Item {0} is already reserved by this borrower")]
    DuplicateReservation(i32),

    #[error("Item {0} is currently out of stock")]
    OutOfStock(i32),

    #[error("Return verification token rejected")]
    AuthorizationFailed,

    #[error("Loan {0} belongs to another borrower")]
    NotOwned(i32),

    #[error("No loans selected for return")]
    EmptyRequest,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
}

impl AppError {
    /// Storage-layer failures, as opposed to business rule rejections
    pub fn is_unavailable(&self) -> bool {
        matches!(self, AppError::Unavailable(_))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, code, message) = match &self {
            AppError::Authentication(_) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthenticated, message)
            }
            AppError::ItemNotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchItem, message),
            AppError::LoanNotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchLoan, message),
            AppError::LimitReached { .. } => {
                (StatusCode::BAD_REQUEST, ErrorCode::LimitReached, message)
            }
            AppError::DuplicateReservation(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::DuplicateReservation, message)
            }
            AppError::OutOfStock(_) => (StatusCode::BAD_REQUEST, ErrorCode::OutOfStock, message),
            AppError::AuthorizationFailed => {
                (StatusCode::UNAUTHORIZED, ErrorCode::VerificationFailed, message)
            }
            AppError::NotOwned(_) => (StatusCode::FORBIDDEN, ErrorCode::NotOwned, message),
            AppError::EmptyRequest => (StatusCode::BAD_REQUEST, ErrorCode::EmptyRequest, message),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, ErrorCode::BadValue, message),
            AppError::Unavailable(e) => {
                tracing::error!("Storage error: {:?}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorCode::StorageUnavailable,
                    "Storage unavailable".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
