//! # cashbook-db: Ledger Storage for Cashbook
//!
//! This crate persists audit records in an append-only ledger, either in
//! SQLite (via sqlx) or in a CSV file, and runs reconciliations against it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cashbook Data Flow                               │
//! │                                                                         │
//! │  cashbook audit --date 01-03-2024 ...                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   cashbook-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Service     │    │    Ledger     │    │  Migrations  │  │   │
//! │  │   │ (service.rs)  │    │ (ledger.rs)   │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ submit        │───►│ SqliteLedger  │    │ 001_audit_   │  │   │
//! │  │   │ history       │    │ CsvLedger     │    │   ledger.sql │  │   │
//! │  │   │ summary/reset │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ledger.db  or  ledger.csv                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`ledger`] - The `LedgerStore` contract and runtime backend choice
//! - [`repository`] - SQLite and CSV ledger implementations
//! - [`service`] - Reconciliation service
//! - [`error`] - Storage and service error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cashbook_db::{Database, DbConfig, ReconciliationService};
//!
//! let db = Database::new(DbConfig::new("ledger.db")).await?;
//! let service = ReconciliationService::new(db.ledger(), AuditPolicy::default());
//!
//! let result = service.submit(&dataset, &entry).await?;
//! let march = service.monthly_summary(Some("2024-03".parse()?)).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, ServiceError, ServiceResult};
pub use ledger::{Ledger, LedgerStore};
pub use pool::{Database, DbConfig};
pub use service::{ReconciliationService, ResetConfirmation};

// Repository re-exports for convenience
pub use repository::csv_ledger::CsvLedger;
pub use repository::sqlite_ledger::SqliteLedger;
