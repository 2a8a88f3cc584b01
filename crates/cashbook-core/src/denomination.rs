//! # Denomination Calculator
//!
//! Turns a note/coin count from the drawer into a physical cash total.
//!
//! ```text
//!   500 × 2  =  1000
//!   100 × 1  =   100
//!    10 × 3  =    30
//!   coins    =     0
//!   ─────────────────
//!   physical    1130
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

/// A note or coin in the fixed rupee schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Denomination {
    Note500,
    Note200,
    Note100,
    Note50,
    Note20,
    Note10,
    Coin5,
    Coin2,
    Coin1,
}

impl Denomination {
    /// Every denomination, largest first.
    pub const ALL: [Denomination; 9] = [
        Denomination::Note500,
        Denomination::Note200,
        Denomination::Note100,
        Denomination::Note50,
        Denomination::Note20,
        Denomination::Note10,
        Denomination::Coin5,
        Denomination::Coin2,
        Denomination::Coin1,
    ];

    /// Face value in whole rupees.
    pub const fn rupees(&self) -> i64 {
        match self {
            Denomination::Note500 => 500,
            Denomination::Note200 => 200,
            Denomination::Note100 => 100,
            Denomination::Note50 => 50,
            Denomination::Note20 => 20,
            Denomination::Note10 => 10,
            Denomination::Coin5 => 5,
            Denomination::Coin2 => 2,
            Denomination::Coin1 => 1,
        }
    }

    /// Face value as money.
    pub const fn face_value(&self) -> Money {
        Money::from_rupees(self.rupees())
    }

    /// Label used in CLI flags and the CSV ledger ("500", "2", ...).
    pub fn label(&self) -> String {
        self.rupees().to_string()
    }
}

/// Drawer count by denomination.
///
/// Counts are unsigned, so a negative count cannot be held. Signed input
/// goes through [`DenominationCount::with`], which rejects it.
///
/// Stores that do not count coins individually put the loose-coin value
/// in `coin_total` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DenominationCount {
    #[serde(default)]
    pub notes_500: u32,
    #[serde(default)]
    pub notes_200: u32,
    #[serde(default)]
    pub notes_100: u32,
    #[serde(default)]
    pub notes_50: u32,
    #[serde(default)]
    pub notes_20: u32,
    #[serde(default)]
    pub notes_10: u32,
    #[serde(default)]
    pub coins_5: u32,
    #[serde(default)]
    pub coins_2: u32,
    #[serde(default)]
    pub coins_1: u32,
    /// Aggregate value of coins not counted piece by piece.
    #[serde(default)]
    pub coin_total: Money,
}

impl DenominationCount {
    /// Returns a copy with `denomination` set to `count`.
    ///
    /// ## Errors
    /// `MustBeNonNegative` for a negative count, `InvalidFormat` when the
    /// count does not fit in a `u32`.
    ///
    /// ## Example
    /// ```rust
    /// use cashbook_core::denomination::{Denomination, DenominationCount};
    ///
    /// let counts = DenominationCount::default()
    ///     .with(Denomination::Note500, 2).unwrap()
    ///     .with(Denomination::Note100, 1).unwrap()
    ///     .with(Denomination::Note10, 3).unwrap();
    /// assert_eq!(counts.physical_total().paise(), 113_000);
    ///
    /// assert!(DenominationCount::default().with(Denomination::Coin5, -1).is_err());
    /// ```
    pub fn with(mut self, denomination: Denomination, count: i64) -> Result<Self, ValidationError> {
        if count < 0 {
            return Err(ValidationError::MustBeNonNegative {
                field: format!("count of {}", denomination.label()),
            });
        }
        let count = u32::try_from(count).map_err(|_| ValidationError::InvalidFormat {
            field: format!("count of {}", denomination.label()),
            reason: "count is too large".to_string(),
        })?;
        *self.slot_mut(denomination) = count;
        Ok(self)
    }

    /// Returns a copy with the aggregate coin value set.
    pub fn with_coin_total(mut self, coin_total: Money) -> Result<Self, ValidationError> {
        if coin_total.is_negative() {
            return Err(ValidationError::MustBeNonNegative {
                field: "coin_total".to_string(),
            });
        }
        self.coin_total = coin_total;
        Ok(self)
    }

    /// Count held for one denomination.
    pub fn count(&self, denomination: Denomination) -> u32 {
        match denomination {
            Denomination::Note500 => self.notes_500,
            Denomination::Note200 => self.notes_200,
            Denomination::Note100 => self.notes_100,
            Denomination::Note50 => self.notes_50,
            Denomination::Note20 => self.notes_20,
            Denomination::Note10 => self.notes_10,
            Denomination::Coin5 => self.coins_5,
            Denomination::Coin2 => self.coins_2,
            Denomination::Coin1 => self.coins_1,
        }
    }

    fn slot_mut(&mut self, denomination: Denomination) -> &mut u32 {
        match denomination {
            Denomination::Note500 => &mut self.notes_500,
            Denomination::Note200 => &mut self.notes_200,
            Denomination::Note100 => &mut self.notes_100,
            Denomination::Note50 => &mut self.notes_50,
            Denomination::Note20 => &mut self.notes_20,
            Denomination::Note10 => &mut self.notes_10,
            Denomination::Coin5 => &mut self.coins_5,
            Denomination::Coin2 => &mut self.coins_2,
            Denomination::Coin1 => &mut self.coins_1,
        }
    }

    /// `Σ count × face value + coin_total`.
    pub fn physical_total(&self) -> Money {
        Denomination::ALL
            .iter()
            .map(|d| d.face_value().multiply_count(i64::from(self.count(*d))))
            .sum::<Money>()
            + self.coin_total
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_example_totals_1130() {
        let counts = DenominationCount {
            notes_500: 2,
            notes_100: 1,
            notes_10: 3,
            ..Default::default()
        };
        assert_eq!(counts.physical_total(), Money::from_rupees(1130));
    }

    #[test]
    fn test_every_denomination_contributes_its_face_value() {
        let mut counts = DenominationCount::default();
        for (i, denomination) in Denomination::ALL.iter().enumerate() {
            counts = counts.with(*denomination, i as i64 + 1).unwrap();
        }
        let expected: i64 = Denomination::ALL
            .iter()
            .enumerate()
            .map(|(i, d)| (i as i64 + 1) * d.rupees())
            .sum();
        assert_eq!(counts.physical_total(), Money::from_rupees(expected));
    }

    #[test]
    fn test_coin_total_variant() {
        let counts = DenominationCount::default()
            .with(Denomination::Note200, 4)
            .unwrap()
            .with_coin_total(Money::parse_decimal("37").unwrap())
            .unwrap();
        assert_eq!(counts.physical_total(), Money::from_rupees(837));
    }

    #[test]
    fn test_empty_drawer_is_zero() {
        assert!(DenominationCount::default().physical_total().is_zero());
    }

    #[test]
    fn test_rejects_negative_counts() {
        let err = DenominationCount::default()
            .with(Denomination::Note50, -2)
            .unwrap_err();
        assert!(matches!(err, ValidationError::MustBeNonNegative { .. }));

        assert!(DenominationCount::default()
            .with_coin_total(Money::from_paise(-1))
            .is_err());
    }

    #[test]
    fn test_rejects_counts_beyond_u32() {
        assert!(DenominationCount::default()
            .with(Denomination::Coin1, i64::from(u32::MAX) + 1)
            .is_err());
    }
}
