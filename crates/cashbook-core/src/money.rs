//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  POS exports carry amounts like "1049.90". Summed as floats:            │
//! │    1049.90 + 200.10 = 1250.0000000000002  ❌ "mismatch" of ₹0.0000002   │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    104990 + 20010 = 125000 paise                                        │
//! │    Rounding happens ONCE, when the report text is parsed               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cashbook_core::money::Money;
//!
//! let cash = Money::from_rupees(1000);
//! let manual = Money::parse_decimal("200.50").unwrap();
//! assert_eq!((cash + manual).paise(), 120_050);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (1/100 of a rupee).
///
/// ## Design Decisions
/// - **i64 (signed)**: variances are negative for shortages
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Transparent serde**: serialises as a plain integer of paise
///
/// ## Where Money Is Used
/// ```text
/// PosRecord.received_cash ──► Expectations.cash ──► VarianceReport.cash
///                                                     ▲
/// ManagerEntry.actual_cash ───────────────────────────┘
///
/// DenominationCount ──► physical_total ──► drawer_difference
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise (the smallest currency unit).
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    ///
    /// ## Example
    /// ```rust
    /// use cashbook_core::money::Money;
    ///
    /// assert_eq!(Money::from_rupees(500).paise(), 50_000);
    /// ```
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion (truncated towards zero).
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Largest magnitude accepted from input: ₹10,000 crore.
    ///
    /// Keeps every sum the pipeline forms (expectation plus manual sale,
    /// a month of deposits) far inside `i64`.
    pub const MAX_AMOUNT: Money = Money(10_000_000_000_000);

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Parses a decimal amount as found in POS exports and manager input.
    ///
    /// ## Accepted Forms
    /// - `"1000"`, `"1000.5"`, `"1000.50"`, `"-50"`, `"  1,049.90 "`
    /// - A leading `₹` is ignored
    /// - More than two fraction digits are rounded half away from zero
    ///
    /// ## Example
    /// ```rust
    /// use cashbook_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("1,049.90").unwrap().paise(), 104_990);
    /// assert_eq!(Money::parse_decimal("0.125").unwrap().paise(), 13);
    /// assert!(Money::parse_decimal("12a").is_err());
    /// ```
    pub fn parse_decimal(input: &str) -> Result<Money, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: format!("'{}' {}", input.trim(), reason),
        };

        let cleaned: String = input
            .trim()
            .trim_start_matches('₹')
            .chars()
            .filter(|c| *c != ',' && !c.is_whitespace())
            .collect();

        let (negative, digits) = match cleaned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
        };

        if digits.is_empty() {
            return Err(invalid("is empty"));
        }

        let (whole, fraction) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("has no digits"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("is not a decimal number"));
        }

        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("is out of range"))?
        };

        // First two fraction digits are paise, the third decides rounding
        let mut fraction_digits = fraction.bytes().map(|b| i64::from(b - b'0'));
        let tens = fraction_digits.next().unwrap_or(0);
        let units = fraction_digits.next().unwrap_or(0);
        let round_up = fraction_digits.next().unwrap_or(0) >= 5;

        let paise = whole_value
            .checked_mul(100)
            .and_then(|p| p.checked_add(tens * 10 + units + i64::from(round_up)))
            .ok_or_else(|| invalid("is out of range"))?;

        if paise > Money::MAX_AMOUNT.0 {
            return Err(invalid("exceeds the largest accepted amount"));
        }

        Ok(Money(if negative { -paise } else { paise }))
    }

    /// True when the magnitude is at most [`Money::MAX_AMOUNT`].
    #[inline]
    pub const fn within_limit(&self) -> bool {
        self.0.unsigned_abs() <= Money::MAX_AMOUNT.0 as u64
    }

    /// Plain decimal text without currency symbol, e.g. `"-50.00"`.
    ///
    /// Round-trips through [`Money::parse_decimal`].
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }

    /// Multiplies money by a count (e.g. a denomination face value by notes).
    #[inline]
    pub const fn multiply_count(&self, count: i64) -> Self {
        Money(self.0 * count)
    }

    /// Divides by a count, rounding half away from zero.
    ///
    /// Returns `None` when `count` is zero.
    pub fn divide_rounded(&self, count: i64) -> Option<Money> {
        if count == 0 {
            return None;
        }
        let numerator = self.0 as i128 * 2;
        let denominator = count as i128;
        let doubled = numerator / denominator;
        // round half away from zero on the doubled quotient
        let rounded = if doubled >= 0 { (doubled + 1) / 2 } else { (doubled - 1) / 2 };
        Some(Money(rounded as i64))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money as rupees with two decimals.
///
/// ## Note
/// This is for logs and the CLI. Locale-aware grouping is out of scope.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
