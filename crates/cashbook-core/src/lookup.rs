//! # POS Lookup
//!
//! Finds the POS row for a business date.
//!
//! ## Match Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. EXACT       row.date == target            (both normalised)         │
//! │                                                                         │
//! │  2. CONTAINED   only if step 1 found nothing. The target must sit in    │
//! │                 the row's date with no digit directly before or after:  │
//! │                                                                         │
//! │                   "01-03-2024 09:00"  ⊇ "01-03-2024"   ✅              │
//! │                   "21-02-2024"        ⊇ "01-02-2024"   ❌ ('2' before)  │
//! │                                                                         │
//! │  3. DUPLICATES  DuplicatePolicy::First  → earliest row, count reported  │
//! │                 DuplicatePolicy::Reject → AmbiguousMatch               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{BusinessDate, PosDataset, PosRecord};

/// Resolution when several rows share a business date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Take the earliest row in report order.
    #[default]
    First,
    /// Refuse to reconcile.
    Reject,
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicatePolicy::First => write!(f, "first"),
            DuplicatePolicy::Reject => write!(f, "reject"),
        }
    }
}

impl FromStr for DuplicatePolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first" => Ok(DuplicatePolicy::First),
            "reject" => Ok(DuplicatePolicy::Reject),
            _ => Err(ValidationError::NotAllowed {
                field: "duplicate_policy".to_string(),
                allowed: vec!["first".to_string(), "reject".to_string()],
            }),
        }
    }
}

/// Which rule produced the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Contained,
}

/// A resolved POS row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PosMatch {
    /// The chosen row.
    pub record: PosRecord,

    /// Rule that matched.
    pub kind: MatchKind,

    /// How many rows matched under that rule (1 unless duplicated upstream).
    pub matches: usize,
}

impl PosMatch {
    /// True when the report carried more than one row for the date.
    pub fn has_duplicates(&self) -> bool {
        self.matches > 1
    }
}

/// Looks up the POS row for `target`.
///
/// Deterministic: the same dataset and target always give the same row.
///
/// ## Errors
/// - `DateNotFound` when no row matches
/// - `AmbiguousMatch` when several rows match and `policy` is `Reject`
pub fn lookup(dataset: &PosDataset, target: &BusinessDate, policy: DuplicatePolicy) -> CoreResult<PosMatch> {
    let rows = dataset.records();

    let exact: Vec<&PosRecord> = rows.iter().filter(|r| r.date == *target).collect();
    let (kind, candidates) = if !exact.is_empty() {
        (MatchKind::Exact, exact)
    } else {
        let contained: Vec<&PosRecord> = rows
            .iter()
            .filter(|r| contains_bounded(r.date.as_str(), target.as_str()))
            .collect();
        (MatchKind::Contained, contained)
    };

    let Some(first) = candidates.first() else {
        return Err(CoreError::DateNotFound {
            date: target.to_string(),
        });
    };

    if candidates.len() > 1 && policy == DuplicatePolicy::Reject {
        return Err(CoreError::AmbiguousMatch {
            date: target.to_string(),
            matches: candidates.len(),
        });
    }

    Ok(PosMatch {
        record: (*first).clone(),
        kind,
        matches: candidates.len(),
    })
}

impl PosDataset {
    /// See [`lookup`].
    pub fn lookup(&self, target: &BusinessDate, policy: DuplicatePolicy) -> CoreResult<PosMatch> {
        lookup(self, target, policy)
    }
}

/// True if `needle` occurs in `haystack` with no ASCII digit touching it.
fn contains_bounded(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }

    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let digit_before = haystack[..start].chars().next_back().is_some_and(|c| c.is_ascii_digit());
        let digit_after = haystack[end..].chars().next().is_some_and(|c| c.is_ascii_digit());
        !digit_before && !digit_after
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn date(s: &str) -> BusinessDate {
        BusinessDate::parse(s).unwrap()
    }

    fn row(d: &str, cash: i64) -> PosRecord {
        PosRecord::new(date(d), Money::from_rupees(cash), Money::zero(), Money::zero())
    }

    #[test]
    fn test_exact_match() {
        let dataset = PosDataset::new(vec![row("29-02-2024", 10), row("01-03-2024", 1000)]);
        let found = dataset.lookup(&date("01-03-2024"), DuplicatePolicy::First).unwrap();
        assert_eq!(found.kind, MatchKind::Exact);
        assert_eq!(found.matches, 1);
        assert_eq!(found.record.received_cash, Money::from_rupees(1000));
    }

    #[test]
    fn test_normalisation_bridges_formats() {
        let dataset = PosDataset::new(vec![row(" 1/3/2024", 1000)]);
        let found = dataset.lookup(&date("01-03-2024"), DuplicatePolicy::First).unwrap();
        assert_eq!(found.kind, MatchKind::Exact);
    }

    #[test]
    fn test_lookup_is_idempotent() {
        let dataset = PosDataset::new(vec![row("01-03-2024", 1000), row("02-03-2024", 2000)]);
        let target = date("02-03-2024");
        let a = dataset.lookup(&target, DuplicatePolicy::First).unwrap();
        let b = dataset.lookup(&target, DuplicatePolicy::First).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_not_found() {
        let dataset = PosDataset::new(vec![row("30-04-2024", 1000)]);
        let err = dataset.lookup(&date("31-04-2024"), DuplicatePolicy::First).unwrap_err();
        assert!(matches!(err, CoreError::DateNotFound { ref date } if date == "31-04-2024"));
    }

    #[test]
    fn test_empty_dataset_is_not_found() {
        let err = PosDataset::default()
            .lookup(&date("01-03-2024"), DuplicatePolicy::First)
            .unwrap_err();
        assert!(matches!(err, CoreError::DateNotFound { .. }));
    }

    #[test]
    fn test_contained_fallback_with_time_suffix() {
        let dataset = PosDataset::new(vec![row("01-03-2024 23:59", 1000)]);
        let found = dataset.lookup(&date("01-03-2024"), DuplicatePolicy::First).unwrap();
        assert_eq!(found.kind, MatchKind::Contained);
    }

    #[test]
    fn test_no_cross_month_substring_collision() {
        let dataset = PosDataset::new(vec![row("21-02-2024", 1000)]);
        let err = dataset.lookup(&date("01-02-2024"), DuplicatePolicy::First).unwrap_err();
        assert!(matches!(err, CoreError::DateNotFound { .. }));
    }

    #[test]
    fn test_exact_beats_contained() {
        let dataset = PosDataset::new(vec![row("01-03-2024 10:00", 1), row("01-03-2024", 2)]);
        let found = dataset.lookup(&date("01-03-2024"), DuplicatePolicy::Reject).unwrap();
        assert_eq!(found.kind, MatchKind::Exact);
        assert_eq!(found.record.received_cash, Money::from_rupees(2));
    }

    #[test]
    fn test_duplicates_first_policy_takes_earliest_row() {
        let dataset = PosDataset::new(vec![row("01-03-2024", 1000), row("01-03-2024", 9999)]);
        let found = dataset.lookup(&date("01-03-2024"), DuplicatePolicy::First).unwrap();
        assert!(found.has_duplicates());
        assert_eq!(found.matches, 2);
        assert_eq!(found.record.received_cash, Money::from_rupees(1000));
    }

    #[test]
    fn test_duplicates_reject_policy() {
        let dataset = PosDataset::new(vec![row("01-03-2024", 1000), row("01-03-2024", 9999)]);
        let err = dataset.lookup(&date("01-03-2024"), DuplicatePolicy::Reject).unwrap_err();
        assert!(matches!(err, CoreError::AmbiguousMatch { matches: 2, .. }));
    }

    #[test]
    fn test_contains_bounded() {
        assert!(contains_bounded("01-03-2024", "01-03-2024"));
        assert!(contains_bounded("Date: 01-03-2024.", "01-03-2024"));
        assert!(!contains_bounded("101-03-2024", "01-03-2024"));
        assert!(!contains_bounded("01-03-20245", "01-03-2024"));
        assert!(!contains_bounded("anything", ""));
    }

    #[test]
    fn test_duplicate_policy_parsing() {
        assert_eq!("First".parse::<DuplicatePolicy>().unwrap(), DuplicatePolicy::First);
        assert_eq!("reject".parse::<DuplicatePolicy>().unwrap(), DuplicatePolicy::Reject);
        assert!("last".parse::<DuplicatePolicy>().is_err());
    }
}
