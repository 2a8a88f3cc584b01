//! # Error Types
//!
//! Domain-specific error types for cashbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cashbook-core errors (this file)                                      │
//! │  ├── CoreError        - Reconciliation failures                        │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  cashbook-db errors (separate crate)                                   │
//! │  ├── DbError          - Ledger storage failures (SchemaMismatch, ...)  │
//! │  └── ServiceError     - CoreError | DbError for the submit flow        │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── AppError         - What the operator sees + exit code             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → AppError           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (date, field, match count)
//! 3. Errors are enum variants, never String
//! 4. Nothing here is ever turned into a zero-valued default

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Reconciliation errors.
///
/// A reconciliation that fails with any of these is rejected wholesale:
/// no audit record is produced, so nothing reaches the ledger.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No POS row matches the requested business date.
    ///
    /// ## User Workflow
    /// ```text
    /// Manager picks 31-04-2024
    ///      │
    ///      ▼
    /// lookup() scans the uploaded report: 0 rows
    ///      │
    ///      ▼
    /// DateNotFound { date: "31-04-2024" }
    ///      │
    ///      ▼
    /// CLI shows: "Data for 31-04-2024 not found in the report"
    /// ```
    #[error("Data for {date} not found in the POS report")]
    DateNotFound { date: String },

    /// Several POS rows match and the duplicate policy is `Reject`.
    #[error("POS report has {matches} rows for {date}; refusing to pick one")]
    AmbiguousMatch { date: String, matches: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when manager input or report data doesn't meet
/// requirements. Raised before any figure is computed.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Amount or count must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g., unparsable amount or period).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
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
        let err = CoreError::DateNotFound {
            date: "31-04-2024".to_string(),
        };
        assert_eq!(err.to_string(), "Data for 31-04-2024 not found in the POS report");

        let err = CoreError::AmbiguousMatch {
            date: "01-03-2024".to_string(),
            matches: 2,
        };
        assert_eq!(
            err.to_string(),
            "POS report has 2 rows for 01-03-2024; refusing to pick one"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "manager".to_string(),
        };
        assert_eq!(err.to_string(), "manager is required");

        let err = ValidationError::MustBeNonNegative {
            field: "actual_cash".to_string(),
        };
        assert_eq!(err.to_string(), "actual_cash must not be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "date".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
