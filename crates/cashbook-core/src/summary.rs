//! # Monthly Aggregator
//!
//! Folds ledger history into one summary per reporting period.
//!
//! ## Summary Fields
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  records                    audits in the period                        │
//! │  net_*_variance             Σ (actual − expected) per channel           │
//! │  net_drawer_difference      Σ (physical − actual_cash)                  │
//! │  total_bank_deposit         Σ bank_deposit                              │
//! │  total_actual_*             Σ declared collections per channel          │
//! │  total_collections          cash + upi + card                           │
//! │  tally_perfect_days         audits whose drawer and cash balanced       │
//! │  average_bill_value         Σ pos_total_sales / Σ pos_total_bills       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nets can cancel out: a ₹50 shortage and a ₹50 excess sum to zero. The
//! per-day figures in the ledger remain the source of truth.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::audit::AuditRecord;
use crate::error::ValidationError;
use crate::money::Money;
use crate::types::BusinessDate;
use crate::variance::Tolerance;

// =============================================================================
// Reporting Period
// =============================================================================

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportingPeriod {
    pub year: i32,
    pub month: u32,
}

impl ReportingPeriod {
    /// Creates a period, rejecting months outside 1-12.
    pub fn new(year: i32, month: u32) -> Result<Self, ValidationError> {
        if !(1..=12).contains(&month) {
            return Err(ValidationError::InvalidFormat {
                field: "period".to_string(),
                reason: format!("month {month} is not between 1 and 12"),
            });
        }
        Ok(ReportingPeriod { year, month })
    }

    /// The period a business date falls in, if the date is numeric.
    pub fn of(date: &BusinessDate) -> Option<Self> {
        let (_, month, year) = date.parts()?;
        ReportingPeriod::new(year, month).ok()
    }

    pub fn contains(&self, date: &BusinessDate) -> bool {
        ReportingPeriod::of(date).is_some_and(|p| p == *self)
    }
}

impl FromStr for ReportingPeriod {
    type Err = ValidationError;

    /// Accepts `YYYY-MM` or `MM-YYYY` (also with `/`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidFormat {
            field: "period".to_string(),
            reason: format!("expected YYYY-MM or MM-YYYY, got '{}'", s.trim()),
        };

        let parts: Vec<&str> = s.trim().split(['-', '/']).collect();
        let [a, b] = parts.as_slice() else {
            return Err(invalid());
        };

        let (year, month) = match (a.len(), b.len()) {
            (4, 1..=2) => (a, b),
            (1..=2, 4) => (b, a),
            _ => return Err(invalid()),
        };

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        ReportingPeriod::new(year, month)
    }
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// =============================================================================
// Monthly Summary
// =============================================================================

/// Aggregated view of a run of audits.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlySummary {
    /// Period the records were filtered to; `None` means all history.
    pub period: Option<ReportingPeriod>,

    pub records: usize,

    pub net_cash_variance: Money,
    pub net_upi_variance: Money,
    pub net_card_variance: Money,
    pub net_drawer_difference: Money,

    pub total_bank_deposit: Money,

    pub total_actual_cash: Money,
    pub total_actual_upi: Money,
    pub total_actual_card: Money,
    pub total_collections: Money,

    pub tally_perfect_days: usize,

    /// `None` when no record carried bill counts.
    pub average_bill_value: Option<Money>,
}

impl MonthlySummary {
    /// Folds `records`, keeping only those inside `period` when one is given.
    ///
    /// Records whose date has no month are skipped by a period filter but
    /// counted in an unfiltered summary.
    pub fn from_records<'a, I>(records: I, period: Option<ReportingPeriod>, tolerance: Tolerance) -> Self
    where
        I: IntoIterator<Item = &'a AuditRecord>,
    {
        let mut summary = MonthlySummary {
            period,
            ..Default::default()
        };
        let mut bill_sales = Money::zero();
        let mut bills: i64 = 0;

        let in_period = records
            .into_iter()
            .filter(|r| period.map_or(true, |p| p.contains(&r.date)));

        for record in in_period {
            summary.records += 1;

            summary.net_cash_variance += record.cash_variance();
            summary.net_upi_variance += record.upi_variance();
            summary.net_card_variance += record.card_variance();
            summary.net_drawer_difference += record.drawer_difference();

            summary.total_bank_deposit += record.bank_deposit;
            summary.total_actual_cash += record.actual_cash;
            summary.total_actual_upi += record.actual_upi;
            summary.total_actual_card += record.actual_card;

            if record.variances(tolerance).tally_perfect {
                summary.tally_perfect_days += 1;
            }

            if let (Some(count), Some(sales)) = (record.pos_total_bills, record.pos_total_sales) {
                bills += count;
                bill_sales += sales;
            }
        }

        summary.total_collections = summary.total_actual_cash + summary.total_actual_upi + summary.total_actual_card;
        summary.average_bill_value = if bills > 0 { bill_sales.divide_rounded(bills) } else { None };
        summary
    }

    pub fn is_empty(&self) -> bool {
        self.records == 0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
