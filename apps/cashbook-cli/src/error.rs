//! # CLI Error Type
//!
//! What the operator sees when a command fails, and the exit code.
//!
//! ## Exit Codes
//! ```text
//! ┌──────┬────────────────────┬────────────────────────────────────────────┐
//! │ Code │ Category           │ Typical cause                              │
//! ├──────┼────────────────────┼────────────────────────────────────────────┤
//! │  0   │ success            │                                            │
//! │  1   │ internal           │ unexpected storage failure                 │
//! │  2   │ usage / validation │ negative amount, bad phrase, bad config    │
//! │  3   │ not found          │ date missing from the POS report           │
//! │  4   │ ambiguous          │ duplicate POS rows under `reject` policy   │
//! │  5   │ import             │ POS report missing columns / bad amounts   │
//! │  6   │ ledger             │ schema mismatch, unreadable ledger row     │
//! └──────┴────────────────────┴────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use cashbook_core::{CoreError, ValidationError};
use cashbook_db::{DbError, ServiceError};
use thiserror::Error;

use crate::pos_import::ImportError;

/// Error categories, each with a process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Internal,
    Usage,
    NotFound,
    Ambiguous,
    Import,
    Ledger,
}

impl ErrorCode {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorCode::Internal => 1,
            ErrorCode::Usage => 2,
            ErrorCode::NotFound => 3,
            ErrorCode::Ambiguous => 4,
            ErrorCode::Import => 5,
            ErrorCode::Ledger => 6,
        }
    }
}

/// A failed command.
#[derive(Debug)]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub hint: Option<String>,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
            hint: None,
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Usage, message)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::usage(err.to_string())
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::DateNotFound { .. } => AppError::new(ErrorCode::NotFound, err.to_string())
                .with_hint("check the date format (DD-MM-YYYY) and that the right report was given"),
            CoreError::AmbiguousMatch { .. } => AppError::new(ErrorCode::Ambiguous, err.to_string())
                .with_hint("fix the POS export or set audit.duplicate_policy = \"first\""),
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::SchemaMismatch { .. } => AppError::new(ErrorCode::Ledger, err.to_string())
                .with_hint("the ledger was written by an older layout; back it up, then run `cashbook reset --confirm RESET`"),
            DbError::InvalidRecord { .. } => AppError::new(ErrorCode::Ledger, err.to_string()),
            other => {
                tracing::error!(error = %other, "Ledger operation failed");
                AppError::new(ErrorCode::Internal, other.to_string())
            }
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Core(e) => e.into(),
            ServiceError::Db(e) => e.into(),
        }
    }
}

impl From<ImportError> for AppError {
    fn from(err: ImportError) -> Self {
        AppError::new(ErrorCode::Import, err.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::usage(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::new(ErrorCode::Internal, err.to_string())
    }
}

// =============================================================================
// Config Error
// =============================================================================

/// Configuration load/save errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not write config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("No config directory available; pass --config")]
    NoConfigPath,

    #[error("Could not determine a data directory for {0}")]
    NoDataDir(PathBuf),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_carries_reset_hint() {
        let err: AppError = DbError::SchemaMismatch {
            missing: vec!["id".to_string()],
        }
        .into();
        assert_eq!(err.code.exit_code(), 6);
        assert!(err.hint.unwrap().contains("cashbook reset --confirm RESET"));
    }

    #[test]
    fn test_not_found_exit_code() {
        let err: AppError = ServiceError::Core(CoreError::DateNotFound {
            date: "31-04-2024".to_string(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.code.exit_code(), 3);
    }
}
