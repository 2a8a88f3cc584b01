//! # Validation Module
//!
//! Input validation for manager entries.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI (clap)                                                   │
//! │  ├── Type validation (numbers, enums)                                  │
//! │  └── Required flags                                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Non-negative money, capped at Money::MAX_AMOUNT                   │
//! │  ├── Identity fields (date, manager, shift)                            │
//! │  └── Runs before any variance is computed                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Ledger storage                                               │
//! │  └── NOT NULL columns / header checks                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{AuditPolicy, ManagerEntry, PosRecord};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted manager name or shift label.
pub const MAX_LABEL_LEN: usize = 100;

/// Validates that an amount is zero or positive.
///
/// ## Example
/// ```rust
/// use cashbook_core::money::Money;
/// use cashbook_core::validation::validate_non_negative;
///
/// assert!(validate_non_negative("actual_cash", Money::from_rupees(10)).is_ok());
/// assert!(validate_non_negative("actual_cash", Money::zero()).is_ok());
/// assert!(validate_non_negative("actual_cash", Money::from_paise(-1)).is_err());
/// ```
pub fn validate_non_negative(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates that an amount is non-negative and at most [`Money::MAX_AMOUNT`].
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    validate_non_negative(field, amount)?;
    if !amount.within_limit() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "exceeds the largest accepted amount".to_string(),
        });
    }
    Ok(())
}

/// Validates an optional label (manager, shift) and returns it trimmed.
///
/// Blank labels collapse to `None`; `required` turns that into an error.
pub fn validate_label(field: &str, value: Option<&str>, required: bool) -> ValidationResult<Option<String>> {
    let trimmed = value.map(str::trim).filter(|v| !v.is_empty());

    match trimmed {
        None if required => Err(ValidationError::Required {
            field: field.to_string(),
        }),
        None => Ok(None),
        Some(v) if v.chars().count() > MAX_LABEL_LEN => Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_LABEL_LEN,
        }),
        Some(v) => Ok(Some(v.to_string())),
    }
}

/// Validates a whole manager entry against the store policy.
///
/// ## Rules
/// - `date` must be non-blank
/// - `manager` is required when `policy.require_manager` is set
/// - every monetary field is non-negative
pub fn validate_entry(entry: &ManagerEntry, policy: &AuditPolicy) -> ValidationResult<()> {
    if entry.date.as_str().trim().is_empty() {
        return Err(ValidationError::Required {
            field: "date".to_string(),
        });
    }

    validate_label("manager", entry.manager.as_deref(), policy.require_manager)?;
    validate_label("shift", entry.shift.as_deref(), false)?;

    validate_amount("actual_cash", entry.actual_cash)?;
    validate_amount("actual_upi", entry.actual_upi)?;
    validate_amount("actual_card", entry.actual_card)?;
    validate_amount("manual_amount", entry.manual_amount)?;
    validate_amount("bank_deposit", entry.bank_deposit)?;
    validate_amount("coin_total", entry.denominations.coin_total)?;

    Ok(())
}

/// Validates the POS amounts an audit is reconciled against.
///
/// Rows built in code bypass the report parser's cap, so the totals are
/// checked again before any expectation is summed from them.
pub fn validate_pos_record(record: &PosRecord) -> ValidationResult<()> {
    validate_amount("received_cash", record.received_cash)?;
    validate_amount("wallet_amount", record.wallet_amount)?;
    validate_amount("card_amount", record.card_amount)?;
    if let Some(total_price) = record.total_price {
        validate_amount("total_price", total_price)?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BusinessDate;

    fn entry() -> ManagerEntry {
        ManagerEntry::new(BusinessDate::parse("01-03-2024").unwrap())
    }

    #[test]
    fn test_validate_label() {
        assert_eq!(validate_label("manager", Some("  Asha "), true).unwrap(), Some("Asha".to_string()));
        assert_eq!(validate_label("shift", Some("   "), false).unwrap(), None);
        assert_eq!(validate_label("shift", None, false).unwrap(), None);
        assert!(validate_label("manager", None, true).is_err());
        assert!(validate_label("manager", Some(""), true).is_err());
        assert!(validate_label("manager", Some(&"x".repeat(101)), false).is_err());
    }

    #[test]
    fn test_entry_requires_manager_when_policy_says_so() {
        let policy = AuditPolicy {
            require_manager: true,
            ..Default::default()
        };
        let err = validate_entry(&entry(), &policy).unwrap_err();
        assert!(matches!(err, ValidationError::Required { ref field } if field == "manager"));

        let mut named = entry();
        named.manager = Some("Ravi".to_string());
        assert!(validate_entry(&named, &policy).is_ok());
    }

    #[test]
    fn test_entry_rejects_negative_money() {
        let mut bad = entry();
        bad.bank_deposit = Money::from_rupees(-1);
        let err = validate_entry(&bad, &AuditPolicy::default()).unwrap_err();
        assert!(matches!(err, ValidationError::MustBeNonNegative { ref field } if field == "bank_deposit"));
    }

    #[test]
    fn test_entry_rejects_amount_past_cap() {
        let mut huge = entry();
        huge.manual_amount = Money::from_paise(i64::MAX);
        let err = validate_entry(&huge, &AuditPolicy::default()).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { ref field, .. } if field == "manual_amount"));

        huge.manual_amount = Money::MAX_AMOUNT;
        assert!(validate_entry(&huge, &AuditPolicy::default()).is_ok());
    }

    #[test]
    fn test_pos_record_amounts_capped() {
        let date = BusinessDate::parse("01-03-2024").unwrap();
        let mut record = PosRecord::new(date, Money::from_rupees(100), Money::zero(), Money::zero());
        assert!(validate_pos_record(&record).is_ok());

        record.total_price = Some(Money::from_paise(i64::MAX - 10));
        let err = validate_pos_record(&record).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { ref field, .. } if field == "total_price"));
    }

    #[test]
    fn test_anonymous_entry_ok_by_default() {
        assert!(validate_entry(&entry(), &AuditPolicy::default()).is_ok());
    }
}
