//! # Ledger Error Types
//!
//! Error types for ledger storage and the reconciliation service.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  sqlx::Error / csv::Error / io::Error                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ServiceError ← joins CoreError (lookup, validation) and DbError       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AppError (in CLI) ← message + exit code                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use cashbook_core::CoreError;
use thiserror::Error;

/// Ledger storage errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// The stored ledger lacks columns the current schema needs.
    ///
    /// ## When This Occurs
    /// - A ledger written by the old spreadsheet layout (no id / manual columns)
    /// - A hand-edited CSV with renamed headers
    ///
    /// Nothing is coerced to zero; the operator has to migrate or reset.
    #[error("Ledger schema mismatch, missing columns: {}", missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    /// A stored row could not be read back.
    #[error("Invalid ledger row {row}: {reason}")]
    InvalidRecord { row: usize, reason: String },

    /// File-level I/O failure.
    #[error("Storage error: {0}")]
    Storage(String),

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

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates an InvalidRecord error.
    pub fn invalid_record(row: usize, reason: impl Into<String>) -> Self {
        DbError::InvalidRecord {
            row,
            reason: reason.into(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database       → DbError::QueryFailed
/// sqlx::Error::PoolTimedOut   → DbError::ConnectionFailed
/// sqlx::Error::PoolClosed     → DbError::ConnectionFailed
/// sqlx::Error::ColumnDecode   → DbError::InvalidRecord
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => DbError::QueryFailed(db_err.message().to_string()),

            sqlx::Error::PoolTimedOut => DbError::ConnectionFailed("Pool timed out".to_string()),

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::ColumnDecode { index, source } => DbError::InvalidRecord {
                row: 0,
                reason: format!("column {index}: {source}"),
            },

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<std::io::Error> for DbError {
    fn from(err: std::io::Error) -> Self {
        DbError::Storage(err.to_string())
    }
}

impl From<csv::Error> for DbError {
    fn from(err: csv::Error) -> Self {
        let row = err.position().map(|p| p.record() as usize);
        match (row, err.kind()) {
            (Some(row), csv::ErrorKind::UnequalLengths { .. }) => DbError::invalid_record(row, err.to_string()),
            _ => DbError::Storage(err.to_string()),
        }
    }
}

/// Result type for ledger operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Service Error
// =============================================================================

/// Errors from the reconciliation service.
///
/// A `Core` error means the audit was rejected before storage was touched.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_lists_columns() {
        let err = DbError::SchemaMismatch {
            missing: vec!["id".to_string(), "manual_mode".to_string()],
        };
        assert_eq!(err.to_string(), "Ledger schema mismatch, missing columns: id, manual_mode");
    }

    #[test]
    fn test_core_error_passes_through() {
        let err: ServiceError = CoreError::DateNotFound {
            date: "31-04-2024".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Data for 31-04-2024 not found in the POS report");
    }
}
