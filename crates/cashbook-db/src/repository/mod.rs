//! # Ledger Backends
//!
//! Implementations of [`LedgerStore`](crate::ledger::LedgerStore).
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ReconciliationService                                                  │
//! │       │  store.append(&record)                                          │
//! │       ▼                                                                 │
//! │  Ledger ──┬── SqliteLedger   audit_ledger table, money in paise         │
//! │           └── CsvLedger      one file, money in rupees                  │
//! │                                                                         │
//! │  Both check stored columns against LEDGER_COLUMNS before loading.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - [`SqliteLedger`](sqlite_ledger::SqliteLedger) - default backend
//! - [`CsvLedger`](csv_ledger::CsvLedger) - spreadsheet-friendly file

pub mod csv_ledger;
pub mod sqlite_ledger;
