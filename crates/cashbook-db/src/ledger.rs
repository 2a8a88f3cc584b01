//! # Ledger Store Contract
//!
//! The append-only history of audit records, independent of backend.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  append(record)   adds exactly one record at the end; atomic            │
//! │  load_all()       every record, in append order; empty if never used    │
//! │  reset()          removes all history (operator-confirmed only)         │
//! │                                                                         │
//! │  Records are never updated in place. Concurrent appends are            │
//! │  linearised: none is lost, none is interleaved with another.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;

use cashbook_core::AuditRecord;

use crate::error::DbResult;
use crate::repository::csv_ledger::CsvLedger;
use crate::repository::sqlite_ledger::SqliteLedger;

/// Persistent, append-only audit history.
pub trait LedgerStore: Send + Sync {
    /// Appends one record.
    fn append(&self, record: &AuditRecord) -> impl Future<Output = DbResult<()>> + Send;

    /// Loads every record in append order.
    ///
    /// ## Errors
    /// `SchemaMismatch` when stored columns lack any of `LEDGER_COLUMNS`.
    fn load_all(&self) -> impl Future<Output = DbResult<Vec<AuditRecord>>> + Send;

    /// Deletes all history.
    fn reset(&self) -> impl Future<Output = DbResult<()>> + Send;
}

/// Ledger backend chosen at runtime from configuration.
#[derive(Debug, Clone)]
pub enum Ledger {
    Sqlite(SqliteLedger),
    Csv(CsvLedger),
}

impl Ledger {
    /// Backend name for logs.
    pub fn backend(&self) -> &'static str {
        match self {
            Ledger::Sqlite(_) => "sqlite",
            Ledger::Csv(_) => "csv",
        }
    }
}

impl From<SqliteLedger> for Ledger {
    fn from(ledger: SqliteLedger) -> Self {
        Ledger::Sqlite(ledger)
    }
}

impl From<CsvLedger> for Ledger {
    fn from(ledger: CsvLedger) -> Self {
        Ledger::Csv(ledger)
    }
}

impl LedgerStore for Ledger {
    async fn append(&self, record: &AuditRecord) -> DbResult<()> {
        match self {
            Ledger::Sqlite(ledger) => ledger.append(record).await,
            Ledger::Csv(ledger) => ledger.append(record).await,
        }
    }

    async fn load_all(&self) -> DbResult<Vec<AuditRecord>> {
        match self {
            Ledger::Sqlite(ledger) => ledger.load_all().await,
            Ledger::Csv(ledger) => ledger.load_all().await,
        }
    }

    async fn reset(&self) -> DbResult<()> {
        match self {
            Ledger::Sqlite(ledger) => ledger.reset().await,
            Ledger::Csv(ledger) => ledger.reset().await,
        }
    }
}
