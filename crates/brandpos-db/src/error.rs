//! # Database Error Types
//!
//! Error types for database operations and sale recording.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)          Business rule (CoreError)         │
//! │       │                                     │                           │
//! │       ▼                                     │                           │
//! │  DbError ← Adds categorization              │                           │
//! │       │                                     │                           │
//! │       └──────────────┬──────────────────────┘                           │
//! │                      ▼                                                  │
//! │  RecordError { Aborted(DbError) | Rejected(CoreError) }                │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │  ApiError (in server) ← Serialized for the dashboard                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use brandpos_core::{CoreError, FailureKind, ValidationError};
use thiserror::Error;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - Restocking, editing or deleting an unknown brand id
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Registering an admin username that is taken
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// CHECK constraint violation.
    ///
    /// ## When This Occurs
    /// - A write that would drive stock negative
    /// - A sale row below the schema minimums
    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed to begin or commit.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Wraps a failure to begin or commit a transaction.
    pub fn transaction(err: sqlx::Error) -> Self {
        match DbError::from(err) {
            DbError::Internal(msg) | DbError::QueryFailed(msg) => DbError::TransactionFailed(msg),
            other => other,
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // CHECK constraint:  "CHECK constraint failed: <expr>"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::ConstraintViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Record Error
// =============================================================================

/// Why a sale was not recorded.
///
/// ## When This Occurs
/// - `Rejected`: the request broke a business rule; nothing was written
/// - `Aborted`: the write itself failed and the transaction rolled back
#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Rejected(#[from] CoreError),

    #[error(transparent)]
    Aborted(#[from] DbError),
}

impl RecordError {
    /// Failure kind reported to callers.
    pub fn kind(&self) -> FailureKind {
        match self {
            RecordError::Rejected(err) => err.kind(),
            RecordError::Aborted(_) => FailureKind::TransactionAborted,
        }
    }
}

impl From<ValidationError> for RecordError {
    fn from(err: ValidationError) -> Self {
        RecordError::Rejected(err.into())
    }
}

impl From<sqlx::Error> for RecordError {
    fn from(err: sqlx::Error) -> Self {
        RecordError::Aborted(err.into())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
