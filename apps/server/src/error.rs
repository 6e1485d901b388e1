//! Error types for the HTTP API.
//!
//! Every handler returns `Result<_, ApiError>`. The body is always JSON:
//!
//! ```text
//! {
//!   "success": false,
//!   "code":    "INSUFFICIENT_STOCK",
//!   "message": "Insufficient stock for Marlboro (Available: 2, Requested: 3)",
//!   "details": { ... }            // optional
//! }
//! ```
//!
//! Database error text is logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use brandpos_core::{CoreError, FailureKind, ValidationError};
use brandpos_db::{DbError, RecordError};

/// Machine-readable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    MissingFields,
    InsufficientPayment,
    BrandNotFound,
    InsufficientStock,
    InvalidPeriod,
    ValidationFailed,
    TransactionAborted,
    InvalidCredentials,
    Unauthorized,
    NotFound,
    Conflict,
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::BrandNotFound | ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::TransactionAborted | ErrorCode::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ErrorCode::MissingFields
            | ErrorCode::InsufficientPayment
            | ErrorCode::InsufficientStock
            | ErrorCode::InvalidPeriod
            | ErrorCode::ValidationFailed
            | ErrorCode::InvalidCredentials => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<FailureKind> for ErrorCode {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::MissingFields => ErrorCode::MissingFields,
            FailureKind::InsufficientPayment => ErrorCode::InsufficientPayment,
            FailureKind::BrandNotFound => ErrorCode::BrandNotFound,
            FailureKind::InsufficientStock => ErrorCode::InsufficientStock,
            FailureKind::InvalidPeriod => ErrorCode::InvalidPeriod,
            FailureKind::ValidationFailed => ErrorCode::ValidationFailed,
            FailureKind::TransactionAborted => ErrorCode::TransactionAborted,
        }
    }
}

/// An error response.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials, "Invalid credentials")
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    /// A failure whose cause stays in the logs.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = json!({
            "success": false,
            "code": self.code,
            "message": self.message,
        });
        if let Some(details) = self.details {
            body["details"] = details;
        }
        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let details = match &err {
            CoreError::MissingFields { fields } => Some(json!({ "fields": fields })),
            CoreError::InsufficientPayment {
                amount_received,
                total_amount,
            } => Some(json!({
                "amountReceived": amount_received.to_decimal_string(),
                "totalAmount": total_amount.to_decimal_string(),
                "difference": amount_received.saturating_sub(*total_amount).to_decimal_string(),
            })),
            CoreError::InsufficientStock {
                brand,
                available,
                requested,
            } => Some(json!({
                "brand": brand,
                "availableStock": available,
                "requestedQuantity": requested,
            })),
            CoreError::Validation(v) => Some(json!({ "field": v.field() })),
            CoreError::BrandNotFound(id) => Some(json!({ "brandId": id })),
            CoreError::InvalidPeriod(_) => None,
        };

        ApiError {
            code: err.kind().into(),
            message: err.to_string(),
            details,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        CoreError::from(err).into()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                ApiError::new(ErrorCode::NotFound, format!("{entity} not found: {id}"))
            }
            DbError::UniqueViolation { field, value } => {
                ApiError::new(ErrorCode::Conflict, format!("{field} already exists: {value}"))
            }
            other => {
                error!(error = %other, "Database operation failed");
                ApiError::internal("Internal server error")
            }
        }
    }
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Rejected(err) => err.into(),
            RecordError::Aborted(err) => {
                error!(error = %err, "Sale transaction aborted");
                ApiError::new(
                    ErrorCode::TransactionAborted,
                    brandpos_db::recorder::ABORTED_MESSAGE,
                )
            }
        }
    }
}
