//! # Domain Types
//!
//! Core domain types used throughout the cashbook.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   PosRecord     │   │  ManagerEntry   │   │  AuditRecord    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  (audit.rs)     │       │
//! │  │  date           │   │  date, shift    │   │  expected vs    │       │
//! │  │  received_cash  │   │  actual_*       │   │  actual per     │       │
//! │  │  wallet_amount  │   │  manual sale    │   │  channel        │       │
//! │  │  card_amount    │   │  denominations  │   │  + timestamp    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  BusinessDate   │   │ PaymentChannel  │   │   ManualMode    │       │
//! │  │  "DD-MM-YYYY"   │   │  Cash/Upi/Card  │   │  None/Cash/     │       │
//! │  │  canonical key  │   │                 │   │  Upi/Card       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::denomination::DenominationCount;
use crate::error::ValidationError;
use crate::lookup::DuplicatePolicy;
use crate::money::Money;
use crate::variance::Tolerance;

// =============================================================================
// Business Date
// =============================================================================

/// Canonical business-date key in `DD-MM-YYYY` form.
///
/// ## Normalisation
/// ```text
///   "  1/3/2024 "        → "01-03-2024"
///   "01.03.2024  09:00"  → "01-03-2024 09:00"
///   "31-04-2024"         → "31-04-2024"   (kept: a key, not a calendar date)
///   "Mar 1st"            → "Mar 1st"      (legacy text kept trimmed)
/// ```
///
/// The key is deliberately not validated against the calendar: a manager
/// asking for `31-04-2024` must get `DateNotFound`, not a parse error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct BusinessDate(String);

impl BusinessDate {
    /// Normalises free-form input into a business-date key.
    ///
    /// ## Errors
    /// `ValidationError::Required` when the input is blank.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let tokens: Vec<String> = input.split_whitespace().map(normalize_date_token).collect();

        if tokens.is_empty() {
            return Err(ValidationError::Required {
                field: "date".to_string(),
            });
        }

        Ok(BusinessDate(tokens.join(" ")))
    }

    /// Returns the normalised key.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `(day, month, year)` when the key starts with a `DD-MM-YYYY` date.
    pub fn parts(&self) -> Option<(u32, u32, i32)> {
        let head = self.0.get(..10)?;
        let bytes = head.as_bytes();
        if bytes[2] != b'-' || bytes[5] != b'-' {
            return None;
        }
        let day = head[0..2].parse().ok()?;
        let month = head[3..5].parse().ok()?;
        let year = head[6..10].parse().ok()?;
        Some((day, month, year))
    }

    /// Month number (1-12) of the key, if it has one.
    pub fn month(&self) -> Option<u32> {
        self.parts().map(|(_, m, _)| m)
    }

    /// Year of the key, if it has one.
    pub fn year(&self) -> Option<i32> {
        self.parts().map(|(_, _, y)| y)
    }
}

/// Zero-pads a `D-M-YYYY` style token (any of `-`, `/`, `.` as separator).
/// Tokens of any other shape come back unchanged.
fn normalize_date_token(token: &str) -> String {
    let parts: Vec<&str> = token.split(['-', '/', '.']).collect();

    let is_date_shaped = parts.len() == 3
        && (1..=2).contains(&parts[0].len())
        && (1..=2).contains(&parts[1].len())
        && parts[2].len() == 4
        && parts.iter().all(|p| p.chars().all(|c| c.is_ascii_digit()));

    if is_date_shaped {
        format!("{:0>2}-{:0>2}-{}", parts[0], parts[1], parts[2])
    } else {
        token.to_string()
    }
}

impl From<NaiveDate> for BusinessDate {
    fn from(date: NaiveDate) -> Self {
        BusinessDate(date.format("%d-%m-%Y").to_string())
    }
}

impl FromStr for BusinessDate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BusinessDate::parse(s)
    }
}

impl fmt::Display for BusinessDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Payment Channel
// =============================================================================

/// A tender channel reported by the POS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentChannel {
    /// Notes and coins in the drawer.
    Cash,
    /// UPI / digital wallet ("WalletAmount" in the report).
    Upi,
    /// Card terminal settlements.
    Card,
}

impl PaymentChannel {
    /// All channels in report order.
    pub const ALL: [PaymentChannel; 3] = [PaymentChannel::Cash, PaymentChannel::Upi, PaymentChannel::Card];
}

impl fmt::Display for PaymentChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentChannel::Cash => write!(f, "Cash"),
            PaymentChannel::Upi => write!(f, "UPI"),
            PaymentChannel::Card => write!(f, "Card"),
        }
    }
}

// =============================================================================
// Manual Mode
// =============================================================================

/// How an off-POS (manual) sale was paid.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ManualMode {
    /// No manual sale to fold in.
    #[default]
    None,
    Cash,
    Upi,
    Card,
}

impl ManualMode {
    /// The channel whose expectation absorbs the manual amount.
    pub fn channel(&self) -> Option<PaymentChannel> {
        match self {
            ManualMode::None => None,
            ManualMode::Cash => Some(PaymentChannel::Cash),
            ManualMode::Upi => Some(PaymentChannel::Upi),
            ManualMode::Card => Some(PaymentChannel::Card),
        }
    }

    /// Lowercase name as stored in the ledger.
    pub fn as_str(&self) -> &'static str {
        match self {
            ManualMode::None => "none",
            ManualMode::Cash => "cash",
            ManualMode::Upi => "upi",
            ManualMode::Card => "card",
        }
    }
}

impl fmt::Display for ManualMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManualMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(ManualMode::None),
            "cash" => Ok(ManualMode::Cash),
            "upi" | "wallet" => Ok(ManualMode::Upi),
            "card" => Ok(ManualMode::Card),
            _ => Err(ValidationError::NotAllowed {
                field: "manual_mode".to_string(),
                allowed: vec![
                    "none".to_string(),
                    "cash".to_string(),
                    "upi".to_string(),
                    "card".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// POS Record
// =============================================================================

/// One row of the POS end-of-day report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PosRecord {
    /// Business date of the row.
    pub date: BusinessDate,

    /// Cash tendered through the POS ("ReceivedCashAmount").
    pub received_cash: Money,

    /// UPI / wallet tendered ("WalletAmount").
    pub wallet_amount: Money,

    /// Card tendered ("CardAmount").
    pub card_amount: Money,

    /// Number of bills printed that day, if the report has it.
    pub total_bills: Option<i64>,

    /// Gross sales value, if the report has it.
    pub total_price: Option<Money>,
}

impl PosRecord {
    /// Creates a record with the three channel totals only.
    pub fn new(date: BusinessDate, received_cash: Money, wallet_amount: Money, card_amount: Money) -> Self {
        PosRecord {
            date,
            received_cash,
            wallet_amount,
            card_amount,
            total_bills: None,
            total_price: None,
        }
    }

    /// Total for one channel.
    pub fn channel_total(&self, channel: PaymentChannel) -> Money {
        match channel {
            PaymentChannel::Cash => self.received_cash,
            PaymentChannel::Upi => self.wallet_amount,
            PaymentChannel::Card => self.card_amount,
        }
    }

    /// Sum of the three channel totals.
    pub fn collections_total(&self) -> Money {
        self.received_cash + self.wallet_amount + self.card_amount
    }
}

// =============================================================================
// POS Dataset
// =============================================================================

/// The rows of one uploaded POS report, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PosDataset {
    records: Vec<PosRecord>,
}

impl PosDataset {
    /// Wraps already-parsed rows.
    pub fn new(records: Vec<PosRecord>) -> Self {
        PosDataset { records }
    }

    /// Rows in file order.
    pub fn records(&self) -> &[PosRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<PosRecord> for PosDataset {
    fn from_iter<I: IntoIterator<Item = PosRecord>>(iter: I) -> Self {
        PosDataset::new(iter.into_iter().collect())
    }
}

// =============================================================================
// Manager Entry
// =============================================================================

/// What the manager declares at close of day.
///
/// Lives only for one reconciliation; it is turned into an
/// [`AuditRecord`](crate::audit::AuditRecord) and then dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerEntry {
    /// Business date being audited.
    pub date: BusinessDate,

    /// Shift label (e.g. "Morning"), if the store runs shifts.
    pub shift: Option<String>,

    /// Name of the manager signing off.
    pub manager: Option<String>,

    /// Cash the manager declares as collected.
    pub actual_cash: Money,

    /// UPI / wallet total from the settlement app.
    pub actual_upi: Money,

    /// Card total from the terminal batch.
    pub actual_card: Money,

    /// Sale value billed outside the POS.
    pub manual_amount: Money,

    /// How the manual sale was paid.
    pub manual_mode: ManualMode,

    /// Physical drawer count.
    pub denominations: DenominationCount,

    /// Cash sent to the bank.
    pub bank_deposit: Money,
}

impl ManagerEntry {
    /// Creates an entry for `date` with every figure at zero.
    pub fn new(date: BusinessDate) -> Self {
        ManagerEntry {
            date,
            shift: None,
            manager: None,
            actual_cash: Money::zero(),
            actual_upi: Money::zero(),
            actual_card: Money::zero(),
            manual_amount: Money::zero(),
            manual_mode: ManualMode::None,
            denominations: DenominationCount::default(),
            bank_deposit: Money::zero(),
        }
    }
}

// =============================================================================
// Audit Policy
// =============================================================================

/// Store-level rules applied to every reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditPolicy {
    /// Refuse entries without a manager name.
    pub require_manager: bool,

    /// What to do when the report has more than one row for the date.
    pub duplicate_policy: DuplicatePolicy,

    /// Rounding tolerance for every "is this zero" check.
    pub tolerance: Tolerance,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_date_normalization() {
        assert_eq!(BusinessDate::parse(" 01-03-2024 ").unwrap().as_str(), "01-03-2024");
        assert_eq!(BusinessDate::parse("1/3/2024").unwrap().as_str(), "01-03-2024");
        assert_eq!(BusinessDate::parse("01.03.2024   09:00").unwrap().as_str(), "01-03-2024 09:00");
        assert_eq!(BusinessDate::parse("31-04-2024").unwrap().as_str(), "31-04-2024");
        assert_eq!(BusinessDate::parse("Mar  1st").unwrap().as_str(), "Mar 1st");
        assert!(BusinessDate::parse("   ").is_err());
    }

    #[test]
    fn test_business_date_parts() {
        let date = BusinessDate::parse("07-11-2024").unwrap();
        assert_eq!(date.parts(), Some((7, 11, 2024)));
        assert_eq!(date.month(), Some(11));
        assert_eq!(date.year(), Some(2024));

        assert_eq!(BusinessDate::parse("yesterday").unwrap().parts(), None);
    }

    #[test]
    fn test_business_date_from_naive_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(BusinessDate::from(date).as_str(), "01-03-2024");
    }

    #[test]
    fn test_manual_mode_parsing() {
        assert_eq!("None".parse::<ManualMode>().unwrap(), ManualMode::None);
        assert_eq!("CASH".parse::<ManualMode>().unwrap(), ManualMode::Cash);
        assert_eq!("upi".parse::<ManualMode>().unwrap(), ManualMode::Upi);
        assert_eq!("wallet".parse::<ManualMode>().unwrap(), ManualMode::Upi);
        assert_eq!(" card ".parse::<ManualMode>().unwrap(), ManualMode::Card);
        assert!("cheque".parse::<ManualMode>().is_err());
    }

    #[test]
    fn test_manual_mode_channel() {
        assert_eq!(ManualMode::None.channel(), None);
        assert_eq!(ManualMode::Upi.channel(), Some(PaymentChannel::Upi));
    }

    #[test]
    fn test_pos_record_totals() {
        let date = BusinessDate::parse("01-03-2024").unwrap();
        let pos = PosRecord::new(date, Money::from_rupees(1000), Money::from_rupees(500), Money::from_rupees(300));
        assert_eq!(pos.collections_total(), Money::from_rupees(1800));
        assert_eq!(pos.channel_total(PaymentChannel::Upi), Money::from_rupees(500));
    }
}
