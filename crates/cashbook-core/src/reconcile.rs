//! # Reconciliation Pipeline
//!
//! Runs one close-of-day audit end to end, without touching storage.
//!
//! ```text
//!   PosDataset ──► lookup ──► PosMatch ──┐
//!                                        ├──► adjust ──► Expectations ──┐
//!   ManagerEntry ── manual sale ─────────┘                              │
//!        │                                                              ▼
//!        ├── denominations ──► physical_total ─────────────────► compute ──► VarianceReport
//!        │                                                              │
//!        └────────────────────────────────────► build_audit_record ◄────┘
//!                                                        │
//!                                                        ▼
//!                                                  AuditRecord
//! ```
//!
//! The caller persists `record`. On any error nothing has been built, so
//! nothing can be appended by mistake.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::adjust::adjust;
use crate::audit::{build_audit_record, AuditRecord};
use crate::error::CoreResult;
use crate::lookup::{lookup, PosMatch};
use crate::types::{AuditPolicy, ManagerEntry, PosDataset};
use crate::validation::{validate_entry, validate_pos_record};
use crate::variance::{compute, Actuals, VarianceReport};

/// Everything a front end shows after an audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Reconciliation {
    /// Record to append to the ledger.
    pub record: AuditRecord,

    /// Variances computed for the record.
    pub variances: VarianceReport,

    /// POS row the audit was reconciled against.
    pub pos_match: PosMatch,
}

/// Reconciles `entry` against `dataset`.
///
/// ## Errors
/// - `Validation` when the entry is malformed (checked before lookup), or
///   the matched POS row carries an amount past [`Money::MAX_AMOUNT`](crate::Money::MAX_AMOUNT)
/// - `DateNotFound` / `AmbiguousMatch` from [`lookup`]
pub fn reconcile(
    dataset: &PosDataset,
    entry: &ManagerEntry,
    policy: &AuditPolicy,
    now: DateTime<Utc>,
) -> CoreResult<Reconciliation> {
    validate_entry(entry, policy)?;

    let pos_match = lookup(dataset, &entry.date, policy.duplicate_policy)?;
    validate_pos_record(&pos_match.record)?;
    let expected = adjust(&pos_match.record, entry.manual_amount, entry.manual_mode);
    let physical_total = entry.denominations.physical_total();

    let variances = compute(&Actuals::from(entry), &expected, physical_total, policy.tolerance);
    let record = build_audit_record(entry, &pos_match.record, &expected, physical_total, policy, now)?;

    Ok(Reconciliation {
        record,
        variances,
        pos_match,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::denomination::Denomination;
    use crate::error::CoreError;
    use crate::money::Money;
    use crate::types::{BusinessDate, ManualMode, PosRecord};

    fn dataset() -> PosDataset {
        PosDataset::new(vec![PosRecord::new(
            BusinessDate::parse("01-03-2024").unwrap(),
            Money::from_rupees(1000),
            Money::from_rupees(500),
            Money::from_rupees(300),
        )])
    }

    fn entry(cash: i64, notes_500: i64) -> ManagerEntry {
        let mut entry = ManagerEntry::new(BusinessDate::parse("01-03-2024").unwrap());
        entry.actual_cash = Money::from_rupees(cash);
        entry.actual_upi = Money::from_rupees(500);
        entry.actual_card = Money::from_rupees(300);
        entry.denominations = entry.denominations.with(Denomination::Note500, notes_500).unwrap();
        entry
    }

    #[test]
    fn test_tally_perfect_day() {
        let result = reconcile(&dataset(), &entry(1000, 2), &AuditPolicy::default(), Utc::now()).unwrap();
        assert!(result.variances.tally_perfect);
        assert!(result.variances.all_balanced());
        assert_eq!(result.record.physical_drawer_total, Money::from_rupees(1000));
        assert_eq!(result.record.variances(result.variances.tolerance), result.variances);
    }

    #[test]
    fn test_cash_shortage_day() {
        let result = reconcile(&dataset(), &entry(950, 2), &AuditPolicy::default(), Utc::now()).unwrap();
        assert_eq!(result.variances.cash, Money::from_rupees(-50));
        assert_eq!(result.variances.drawer_difference, Money::from_rupees(50));
        assert!(!result.variances.tally_perfect);
    }

    #[test]
    fn test_manual_cash_sale_day() {
        let mut manual = entry(1200, 2);
        manual.manual_amount = Money::from_rupees(200);
        manual.manual_mode = ManualMode::Cash;
        manual.denominations = manual.denominations.with(Denomination::Note100, 2).unwrap();

        let result = reconcile(&dataset(), &manual, &AuditPolicy::default(), Utc::now()).unwrap();
        assert_eq!(result.record.pos_cash_expected, Money::from_rupees(1200));
        assert!(result.variances.cash.is_zero());
        assert!(result.variances.tally_perfect);
    }

    #[test]
    fn test_unknown_date_builds_nothing() {
        let mut missing = entry(1000, 2);
        missing.date = BusinessDate::parse("31-04-2024").unwrap();
        let err = reconcile(&dataset(), &missing, &AuditPolicy::default(), Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::DateNotFound { .. }));
    }

    #[test]
    fn test_invalid_entry_rejected_before_lookup() {
        let mut bad = entry(1000, 2);
        bad.date = BusinessDate::parse("31-04-2024").unwrap();
        bad.actual_upi = Money::from_rupees(-1);
        let err = reconcile(&dataset(), &bad, &AuditPolicy::default(), Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_oversized_pos_amount_is_validation_error() {
        let date = BusinessDate::parse("01-03-2024").unwrap();
        let dataset = PosDataset::new(vec![PosRecord::new(
            date.clone(),
            Money::from_paise(i64::MAX - 10),
            Money::zero(),
            Money::zero(),
        )]);
        let mut entry = ManagerEntry::new(date);
        entry.manual_amount = Money::from_rupees(100);
        entry.manual_mode = ManualMode::Cash;

        let err = reconcile(&dataset, &entry, &AuditPolicy::default(), Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
