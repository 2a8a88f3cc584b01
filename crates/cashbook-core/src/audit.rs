//! # Audit Records
//!
//! The immutable, append-only output of a reconciliation.
//!
//! ## What Is Stored vs. Derived
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  STORED (ledger columns)               DERIVED ON READ                  │
//! │  ─────────────────────────             ───────────────────────          │
//! │  actual_cash, pos_cash_expected   ──►  cash_variance                    │
//! │  actual_upi,  pos_upi_expected    ──►  upi_variance                     │
//! │  actual_card, pos_card_expected   ──►  card_variance                    │
//! │  physical_drawer_total            ──►  drawer_difference                │
//! │                                                                         │
//! │  Variances are never written, so they can never disagree with the      │
//! │  figures they come from.                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::adjust::Expectations;
use crate::error::CoreResult;
use crate::money::Money;
use crate::types::{AuditPolicy, BusinessDate, ManagerEntry, ManualMode, PosRecord};
use crate::validation::validate_label;
use crate::variance::{self, Actuals, Tolerance, VarianceReport};

// =============================================================================
// Ledger Schema
// =============================================================================

/// Version of the ledger column set.
///
/// Version 1 (the legacy spreadsheet layout) had no id, manual sale or POS
/// bill columns; loading such a ledger raises a schema mismatch.
pub const LEDGER_SCHEMA_VERSION: u32 = 2;

/// Ledger columns in storage order.
pub const LEDGER_COLUMNS: [&str; 17] = [
    "id",
    "date",
    "shift",
    "manager",
    "actual_cash",
    "pos_cash_expected",
    "actual_upi",
    "pos_upi_expected",
    "actual_card",
    "pos_card_expected",
    "physical_drawer_total",
    "bank_deposit",
    "manual_amount",
    "manual_mode",
    "pos_total_bills",
    "pos_total_sales",
    "timestamp",
];

/// Schema columns absent from `present`, in schema order.
pub fn missing_columns<'a, I>(present: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let present: Vec<&str> = present.into_iter().map(str::trim).collect();
    LEDGER_COLUMNS
        .iter()
        .filter(|column| !present.contains(column))
        .map(|column| column.to_string())
        .collect()
}

// =============================================================================
// Audit Record
// =============================================================================

/// One persisted reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AuditRecord {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub date: BusinessDate,
    pub shift: Option<String>,
    pub manager: Option<String>,

    pub actual_cash: Money,
    /// POS cash plus any manual cash sale.
    pub pos_cash_expected: Money,

    pub actual_upi: Money,
    pub pos_upi_expected: Money,

    pub actual_card: Money,
    pub pos_card_expected: Money,

    /// Drawer total from the denomination count.
    pub physical_drawer_total: Money,

    pub bank_deposit: Money,

    pub manual_amount: Money,
    pub manual_mode: ManualMode,

    /// Bill count from the POS row, when the report carries it.
    pub pos_total_bills: Option<i64>,

    /// Gross sales from the POS row, when the report carries it.
    pub pos_total_sales: Option<Money>,

    /// When the audit was submitted.
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    pub fn cash_variance(&self) -> Money {
        self.actual_cash - self.pos_cash_expected
    }

    pub fn upi_variance(&self) -> Money {
        self.actual_upi - self.pos_upi_expected
    }

    pub fn card_variance(&self) -> Money {
        self.actual_card - self.pos_card_expected
    }

    pub fn drawer_difference(&self) -> Money {
        self.physical_drawer_total - self.actual_cash
    }

    /// Stored expectations.
    pub fn expectations(&self) -> Expectations {
        Expectations {
            cash: self.pos_cash_expected,
            upi: self.pos_upi_expected,
            card: self.pos_card_expected,
        }
    }

    /// Stored actuals.
    pub fn actuals(&self) -> Actuals {
        Actuals {
            cash: self.actual_cash,
            upi: self.actual_upi,
            card: self.actual_card,
        }
    }

    /// Recomputes the full variance report from the stored figures.
    pub fn variances(&self, tolerance: Tolerance) -> VarianceReport {
        variance::compute(&self.actuals(), &self.expectations(), self.physical_drawer_total, tolerance)
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Assembles an [`AuditRecord`] from an entry already checked by
/// [`validate_entry`](crate::validation::validate_entry) and the computed
/// expectations. Only the manager and shift labels are normalised here.
///
/// ## Errors
/// `ValidationError` (wrapped in `CoreError`) when the manager is missing
/// under `policy.require_manager` or a label is too long.
pub fn build_audit_record(
    entry: &ManagerEntry,
    pos: &PosRecord,
    expected: &Expectations,
    physical_total: Money,
    policy: &AuditPolicy,
    timestamp: DateTime<Utc>,
) -> CoreResult<AuditRecord> {
    let manager = validate_label("manager", entry.manager.as_deref(), policy.require_manager)?;
    let shift = validate_label("shift", entry.shift.as_deref(), false)?;

    Ok(AuditRecord {
        id: Uuid::new_v4().to_string(),
        date: entry.date.clone(),
        shift,
        manager,
        actual_cash: entry.actual_cash,
        pos_cash_expected: expected.cash,
        actual_upi: entry.actual_upi,
        pos_upi_expected: expected.upi,
        actual_card: entry.actual_card,
        pos_card_expected: expected.card,
        physical_drawer_total: physical_total,
        bank_deposit: entry.bank_deposit,
        manual_amount: entry.manual_amount,
        manual_mode: entry.manual_mode,
        pos_total_bills: pos.total_bills,
        pos_total_sales: pos.total_price,
        timestamp,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjust::adjust;
    use crate::error::CoreError;

    fn pos() -> PosRecord {
        let mut pos = PosRecord::new(
            BusinessDate::parse("01-03-2024").unwrap(),
            Money::from_rupees(1000),
            Money::from_rupees(500),
            Money::from_rupees(300),
        );
        pos.total_bills = Some(42);
        pos.total_price = Some(Money::from_rupees(1800));
        pos
    }

    fn entry() -> ManagerEntry {
        let mut entry = ManagerEntry::new(BusinessDate::parse("01-03-2024").unwrap());
        entry.manager = Some(" Asha ".to_string());
        entry.actual_cash = Money::from_rupees(950);
        entry.actual_upi = Money::from_rupees(500);
        entry.actual_card = Money::from_rupees(300);
        entry.bank_deposit = Money::from_rupees(900);
        entry
    }

    #[test]
    fn test_builds_record_with_derived_variances() {
        let expected = adjust(&pos(), Money::zero(), ManualMode::None);
        let record = build_audit_record(
            &entry(),
            &pos(),
            &expected,
            Money::from_rupees(1000),
            &AuditPolicy::default(),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(record.manager.as_deref(), Some("Asha"));
        assert_eq!(record.cash_variance(), Money::from_rupees(-50));
        assert_eq!(record.drawer_difference(), Money::from_rupees(50));
        assert!(record.upi_variance().is_zero());
        assert_eq!(record.pos_total_bills, Some(42));
        assert!(!record.variances(Tolerance::DEFAULT).tally_perfect);
        assert!(Uuid::parse_str(&record.id).is_ok());
    }

    #[test]
    fn test_missing_manager_is_validation_error() {
        let mut anonymous = entry();
        anonymous.manager = None;
        let policy = AuditPolicy {
            require_manager: true,
            ..Default::default()
        };
        let expected = adjust(&pos(), Money::zero(), ManualMode::None);
        let err = build_audit_record(&anonymous, &pos(), &expected, Money::zero(), &policy, Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_each_record_gets_fresh_id() {
        let expected = adjust(&pos(), Money::zero(), ManualMode::None);
        let a = build_audit_record(&entry(), &pos(), &expected, Money::zero(), &AuditPolicy::default(), Utc::now()).unwrap();
        let b = build_audit_record(&entry(), &pos(), &expected, Money::zero(), &AuditPolicy::default(), Utc::now()).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_missing_columns() {
        assert!(missing_columns(LEDGER_COLUMNS).is_empty());

        let v1 = ["date", "actual_cash", "pos_cash_expected", "timestamp"];
        let missing = missing_columns(v1);
        assert!(missing.contains(&"id".to_string()));
        assert!(missing.contains(&"manual_mode".to_string()));
        assert!(!missing.contains(&"date".to_string()));
    }

    #[test]
    fn test_record_serializes_money_as_paise() {
        let expected = adjust(&pos(), Money::zero(), ManualMode::None);
        let record = build_audit_record(&entry(), &pos(), &expected, Money::zero(), &AuditPolicy::default(), Utc::now()).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["actual_cash"], 95_000);
        assert_eq!(json["manual_mode"], "none");
        assert_eq!(json["date"], "01-03-2024");
    }
}
