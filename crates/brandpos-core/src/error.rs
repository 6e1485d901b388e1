//! # Error Types
//!
//! Domain-specific error types for brandpos-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  brandpos-core errors (this file)                                      │
//! │  ├── CoreError        - Sale / report rule violations                  │
//! │  ├── ValidationError  - Field-level input failures                     │
//! │  └── FailureKind      - The stable kind reported to callers            │
//! │                                                                         │
//! │  brandpos-db errors (separate crate)                                   │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── RecordError      - CoreError | DbError from the Sale Recorder     │
//! │                                                                         │
//! │  brandpos-server errors                                                │
//! │  └── ApiError         - What the dashboard sees (JSON)                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → RecordError → ApiError → Client   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Failure Kind
// =============================================================================

/// The kind of failure a sale or report operation ended with.
///
/// Every rejected request maps onto exactly one of these, so callers can
/// branch on the kind instead of parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// Required input absent or of the wrong type.
    MissingFields,
    /// Amount received below the amount charged.
    InsufficientPayment,
    /// Referenced brand does not exist.
    BrandNotFound,
    /// Requested quantity exceeds stock on hand.
    InsufficientStock,
    /// Unrecognised report period token.
    InvalidPeriod,
    /// Record violates a schema-level constraint.
    ValidationFailed,
    /// The underlying write failed or was rolled back.
    TransactionAborted,
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// One or more required fields are absent or mistyped.
    #[error("Missing required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },

    /// Customer paid less than the line total.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout: total $12.00, received $10.00
    ///      │
    ///      ▼
    /// InsufficientPayment { amount_received: $10.00, total_amount: $12.00 }
    ///      │
    ///      ▼
    /// UI shows: "Amount received must be >= total amount"
    /// ```
    #[error("Amount received ({amount_received}) is less than total amount ({total_amount})")]
    InsufficientPayment {
        amount_received: Money,
        total_amount: Money,
    },

    /// Brand cannot be found.
    #[error("Brand not found: {0}")]
    BrandNotFound(String),

    /// Insufficient stock to complete sale.
    #[error("Insufficient stock for {brand} (Available: {available}, Requested: {requested})")]
    InsufficientStock {
        brand: String,
        available: i64,
        requested: i64,
    },

    /// Report period token is not one of day/week/month/year/custom, or a
    /// custom range could not be read.
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a MissingFields error from field names.
    pub fn missing<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CoreError::MissingFields {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the failure kind reported to callers.
    pub fn kind(&self) -> FailureKind {
        match self {
            CoreError::MissingFields { .. } => FailureKind::MissingFields,
            CoreError::InsufficientPayment { .. } => FailureKind::InsufficientPayment,
            CoreError::BrandNotFound(_) => FailureKind::BrandNotFound,
            CoreError::InsufficientStock { .. } => FailureKind::InsufficientStock,
            CoreError::InvalidPeriod(_) => FailureKind::InvalidPeriod,
            CoreError::Validation(_) => FailureKind::ValidationFailed,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Schema-level constraints on a record: the value has the right type but
/// an unacceptable shape.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be a whole number.
    #[error("{value} is not an integer value")]
    NotInteger { field: String, value: String },

    /// Value is below the allowed minimum.
    #[error("{field} must be at least {min}")]
    BelowMinimum { field: String, min: String },

    /// Value is above the allowed maximum.
    #[error("{field} must be at most {max}")]
    AboveMaximum { field: String, max: String },

    /// Invalid format (e.g. invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Returns the name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::NotInteger { field, .. }
            | ValidationError::BelowMinimum { field, .. }
            | ValidationError::AboveMaximum { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            brand: "Marlboro".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Marlboro (Available: 3, Requested: 5)"
        );

        let err = CoreError::missing(["brandId", "quantity"]);
        assert_eq!(err.to_string(), "Missing required fields: brandId, quantity");
    }

    #[test]
    fn test_payment_message_uses_money_display() {
        let err = CoreError::InsufficientPayment {
            amount_received: Money::from_cents(1000),
            total_amount: Money::from_cents(1200),
        };
        assert_eq!(
            err.to_string(),
            "Amount received ($10.00) is less than total amount ($12.00)"
        );
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            CoreError::BrandNotFound("x".into()).kind(),
            FailureKind::BrandNotFound
        );
        assert_eq!(
            CoreError::InvalidPeriod("decade".into()).kind(),
            FailureKind::InvalidPeriod
        );
        let validation: CoreError = ValidationError::NotInteger {
            field: "quantity".into(),
            value: "1.5".into(),
        }
        .into();
        assert_eq!(validation.kind(), FailureKind::ValidationFailed);
    }

    #[test]
    fn test_failure_kind_serialization() {
        let json = serde_json::to_string(&FailureKind::InsufficientStock).unwrap();
        assert_eq!(json, "\"INSUFFICIENT_STOCK\"");
    }

    #[test]
    fn test_validation_field_accessor() {
        let err = ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        };
        assert_eq!(err.field(), "name");
        assert_eq!(err.to_string(), "name must be at most 200 characters");
    }
}
