//! # cashbook-core: Pure Reconciliation Logic for Cashbook
//!
//! This crate is the **heart** of Cashbook. It turns a POS end-of-day report
//! and a manager's close-of-day count into an audit record, as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cashbook Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    cashbook (CLI)                               │   │
//! │  │    POS CSV import ──► audit ──► history ──► summary             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ cashbook-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  lookup   │  │  adjust   │  │ variance  │  │   audit   │  │   │
//! │  │   │  POS row  │  │  manual   │  │  actual − │  │  record   │  │   │
//! │  │   │  by date  │  │  sales    │  │  expected │  │  builder  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │denomina-  │  │  summary  │  │   money   │                  │   │
//! │  │   │tion count │  │  monthly  │  │  paise    │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO FILES • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 cashbook-db (Ledger Layer)                      │   │
//! │  │         SQLite / CSV ledgers, reconciliation service            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money in integer paise (no floating point)
//! - [`types`] - Business dates, POS rows, manager entries
//! - [`denomination`] - Physical drawer count
//! - [`lookup`] - Finding the POS row for a date
//! - [`adjust`] - Folding manual sales into expectations
//! - [`variance`] - Variances, tolerance and tally status
//! - [`audit`] - The immutable ledger record
//! - [`reconcile`] - The whole pipeline in one call
//! - [`summary`] - Monthly aggregation of ledger history
//! - [`validation`] - Entry validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use cashbook_core::{reconcile, AuditPolicy, BusinessDate, ManagerEntry, Money, PosDataset, PosRecord};
//! use cashbook_core::denomination::Denomination;
//!
//! let date = BusinessDate::parse("01-03-2024").unwrap();
//! let dataset = PosDataset::new(vec![PosRecord::new(
//!     date.clone(),
//!     Money::from_rupees(1000),
//!     Money::from_rupees(500),
//!     Money::from_rupees(300),
//! )]);
//!
//! let mut entry = ManagerEntry::new(date);
//! entry.actual_cash = Money::from_rupees(1000);
//! entry.actual_upi = Money::from_rupees(500);
//! entry.actual_card = Money::from_rupees(300);
//! entry.denominations = entry.denominations.with(Denomination::Note500, 2).unwrap();
//!
//! let result = reconcile(&dataset, &entry, &AuditPolicy::default(), chrono::Utc::now()).unwrap();
//! assert!(result.variances.tally_perfect);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod adjust;
pub mod audit;
pub mod denomination;
pub mod error;
pub mod lookup;
pub mod money;
pub mod reconcile;
pub mod summary;
pub mod types;
pub mod validation;
pub mod variance;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use adjust::{adjust, Expectations};
pub use audit::{build_audit_record, AuditRecord, LEDGER_COLUMNS, LEDGER_SCHEMA_VERSION};
pub use denomination::{Denomination, DenominationCount};
pub use error::{CoreError, CoreResult, ValidationError};
pub use lookup::{DuplicatePolicy, MatchKind, PosMatch};
pub use money::Money;
pub use reconcile::{reconcile, Reconciliation};
pub use summary::{MonthlySummary, ReportingPeriod};
pub use types::*;
pub use variance::{Actuals, ChannelStatus, Tolerance, VarianceReport};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Phrase an operator must type to wipe the ledger.
pub const RESET_PHRASE: &str = "RESET";
