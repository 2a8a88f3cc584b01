//! # Variance Engine
//!
//! Compares declared figures against expectations and the drawer count.
//!
//! ## Sign Convention
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  variance          = actual   − expected       (per channel)            │
//! │  drawer_difference = physical − actual_cash                             │
//! │                                                                         │
//! │    negative → SHORTAGE     zero (± tolerance) → BALANCED               │
//! │    positive → EXCESS                                                    │
//! │                                                                         │
//! │  tally_perfect = drawer_difference ≈ 0  AND  cash variance ≈ 0          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One [`Tolerance`] is applied to all four figures. Money is integer paise,
//! so the default tolerance of one paisa only absorbs rounding done when a
//! report was exported.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::adjust::Expectations;
use crate::money::Money;
use crate::types::{ManagerEntry, PaymentChannel};

// =============================================================================
// Tolerance
// =============================================================================

/// Largest absolute amount still treated as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct Tolerance(Money);

impl Tolerance {
    /// One paisa (₹0.01).
    pub const DEFAULT: Tolerance = Tolerance(Money::from_paise(1));

    /// Exact comparison.
    pub const EXACT: Tolerance = Tolerance(Money::zero());

    /// Creates a tolerance; the sign of `amount` is ignored.
    pub const fn new(amount: Money) -> Self {
        Tolerance(amount.abs())
    }

    pub const fn amount(&self) -> Money {
        self.0
    }

    /// True when `|value| <= tolerance`.
    #[inline]
    pub fn is_zero(&self, value: Money) -> bool {
        value.abs() <= self.0
    }

    /// Classifies a signed difference.
    pub fn classify(&self, value: Money) -> ChannelStatus {
        if self.is_zero(value) {
            ChannelStatus::Balanced
        } else if value.is_negative() {
            ChannelStatus::Shortage
        } else {
            ChannelStatus::Excess
        }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance::DEFAULT
    }
}

/// Outcome for one compared figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ChannelStatus {
    Balanced,
    Shortage,
    Excess,
}

// =============================================================================
// Actuals
// =============================================================================

/// Manager-declared collections per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Actuals {
    pub cash: Money,
    pub upi: Money,
    pub card: Money,
}

impl Actuals {
    pub fn channel(&self, channel: PaymentChannel) -> Money {
        match channel {
            PaymentChannel::Cash => self.cash,
            PaymentChannel::Upi => self.upi,
            PaymentChannel::Card => self.card,
        }
    }
}

impl From<&ManagerEntry> for Actuals {
    fn from(entry: &ManagerEntry) -> Self {
        Actuals {
            cash: entry.actual_cash,
            upi: entry.actual_upi,
            card: entry.actual_card,
        }
    }
}

// =============================================================================
// Variance Report
// =============================================================================

/// Signed variances and tally status for one audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VarianceReport {
    /// `actual_cash − expected cash`.
    pub cash: Money,

    /// `actual_upi − expected upi`.
    pub upi: Money,

    /// `actual_card − expected card`.
    pub card: Money,

    /// `physical drawer total − actual_cash`.
    pub drawer_difference: Money,

    /// Drawer and cash both balanced within tolerance.
    pub tally_perfect: bool,

    /// Tolerance the report was computed with.
    pub tolerance: Tolerance,
}

impl VarianceReport {
    /// Variance for one channel.
    pub fn channel(&self, channel: PaymentChannel) -> Money {
        match channel {
            PaymentChannel::Cash => self.cash,
            PaymentChannel::Upi => self.upi,
            PaymentChannel::Card => self.card,
        }
    }

    /// Balanced / shortage / excess for one channel.
    pub fn status(&self, channel: PaymentChannel) -> ChannelStatus {
        self.tolerance.classify(self.channel(channel))
    }

    /// Balanced / shortage / excess for the drawer count.
    pub fn drawer_status(&self) -> ChannelStatus {
        self.tolerance.classify(self.drawer_difference)
    }

    /// Every channel and the drawer are within tolerance.
    pub fn all_balanced(&self) -> bool {
        self.tally_perfect
            && self.tolerance.is_zero(self.upi)
            && self.tolerance.is_zero(self.card)
    }

    /// Channels with a non-zero variance, in report order.
    pub fn mismatched_channels(&self) -> Vec<PaymentChannel> {
        PaymentChannel::ALL
            .into_iter()
            .filter(|c| !self.tolerance.is_zero(self.channel(*c)))
            .collect()
    }
}

/// Computes variances. Pure: no I/O, no state.
pub fn compute(
    actuals: &Actuals,
    expected: &Expectations,
    physical_total: Money,
    tolerance: Tolerance,
) -> VarianceReport {
    let cash = actuals.cash - expected.cash;
    let upi = actuals.upi - expected.upi;
    let card = actuals.card - expected.card;
    let drawer_difference = physical_total - actuals.cash;

    VarianceReport {
        cash,
        upi,
        card,
        drawer_difference,
        tally_perfect: tolerance.is_zero(drawer_difference) && tolerance.is_zero(cash),
        tolerance,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn expected() -> Expectations {
        Expectations {
            cash: Money::from_rupees(1000),
            upi: Money::from_rupees(500),
            card: Money::from_rupees(300),
        }
    }

    fn actuals(cash: i64, upi: i64, card: i64) -> Actuals {
        Actuals {
            cash: Money::from_rupees(cash),
            upi: Money::from_rupees(upi),
            card: Money::from_rupees(card),
        }
    }

    #[test]
    fn test_tally_perfect() {
        let report = compute(&actuals(1000, 500, 300), &expected(), Money::from_rupees(1000), Tolerance::DEFAULT);
        assert!(report.cash.is_zero());
        assert!(report.upi.is_zero());
        assert!(report.card.is_zero());
        assert!(report.drawer_difference.is_zero());
        assert!(report.tally_perfect);
        assert!(report.all_balanced());
        assert!(report.mismatched_channels().is_empty());
    }

    #[test]
    fn test_cash_shortage_with_full_drawer() {
        let report = compute(&actuals(950, 500, 300), &expected(), Money::from_rupees(1000), Tolerance::DEFAULT);
        assert_eq!(report.cash, Money::from_rupees(-50));
        assert_eq!(report.drawer_difference, Money::from_rupees(50));
        assert_eq!(report.status(PaymentChannel::Cash), ChannelStatus::Shortage);
        assert_eq!(report.drawer_status(), ChannelStatus::Excess);
        assert!(!report.tally_perfect);
        assert_eq!(report.mismatched_channels(), vec![PaymentChannel::Cash]);
    }

    #[test]
    fn test_upi_mismatch_does_not_break_tally() {
        let report = compute(&actuals(1000, 480, 300), &expected(), Money::from_rupees(1000), Tolerance::DEFAULT);
        assert!(report.tally_perfect);
        assert!(!report.all_balanced());
        assert_eq!(report.status(PaymentChannel::Upi), ChannelStatus::Shortage);
    }

    #[test]
    fn test_tolerance_applies_uniformly() {
        let expected = Expectations {
            cash: Money::from_paise(100_001),
            upi: Money::from_paise(49_999),
            card: Money::from_paise(30_001),
        };
        let report = compute(&actuals(1000, 500, 300), &expected, Money::from_paise(100_001), Tolerance::DEFAULT);
        assert!(report.all_balanced());

        let strict = compute(&actuals(1000, 500, 300), &expected, Money::from_paise(100_001), Tolerance::EXACT);
        assert!(!strict.tally_perfect);
        assert_eq!(strict.mismatched_channels().len(), 3);
    }

    #[test]
    fn test_tolerance_ignores_sign() {
        let tolerance = Tolerance::new(Money::from_paise(-5));
        assert_eq!(tolerance.amount(), Money::from_paise(5));
        assert!(tolerance.is_zero(Money::from_paise(-5)));
        assert!(!tolerance.is_zero(Money::from_paise(6)));
    }
}
