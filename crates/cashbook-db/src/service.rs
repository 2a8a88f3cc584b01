//! # Reconciliation Service
//!
//! Wires the pure pipeline to a ledger.
//!
//! ## Submit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  submit(dataset, entry)                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  cashbook_core::reconcile ──► Err(CoreError) ──► return, ledger untouched│
//! │       │ Ok                                                              │
//! │       ▼                                                                 │
//! │  store.append(&record).await ──► Err(DbError) ──► return               │
//! │       │ Ok                                                              │
//! │       ▼                                                                 │
//! │  Reconciliation { record, variances, pos_match }                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use tracing::{info, warn};

use cashbook_core::{
    reconcile, AuditPolicy, AuditRecord, ManagerEntry, MonthlySummary, PosDataset, Reconciliation, ReportingPeriod,
    ValidationError, RESET_PHRASE,
};

use crate::error::ServiceResult;
use crate::ledger::LedgerStore;

/// Proof that an operator typed the reset phrase.
///
/// The only way to build one is [`ResetConfirmation::parse`], so
/// [`ReconciliationService::reset`] can't be reached by accident.
#[derive(Debug)]
pub struct ResetConfirmation(());

impl ResetConfirmation {
    /// Accepts exactly `RESET` (surrounding whitespace ignored).
    pub fn parse(phrase: &str) -> Result<Self, ValidationError> {
        if phrase.trim() == RESET_PHRASE {
            Ok(ResetConfirmation(()))
        } else {
            Err(ValidationError::InvalidFormat {
                field: "confirm".to_string(),
                reason: format!("type {RESET_PHRASE} to wipe the ledger"),
            })
        }
    }
}

/// Runs reconciliations against one ledger.
#[derive(Debug, Clone)]
pub struct ReconciliationService<S> {
    store: S,
    policy: AuditPolicy,
}

impl<S: LedgerStore> ReconciliationService<S> {
    pub fn new(store: S, policy: AuditPolicy) -> Self {
        ReconciliationService { store, policy }
    }

    pub fn policy(&self) -> &AuditPolicy {
        &self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reconciles `entry` against `dataset` and appends the audit record.
    ///
    /// Returns only after the append has completed.
    pub async fn submit(&self, dataset: &PosDataset, entry: &ManagerEntry) -> ServiceResult<Reconciliation> {
        let result = reconcile(dataset, entry, &self.policy, Utc::now())?;

        if result.pos_match.has_duplicates() {
            warn!(
                date = %entry.date,
                matches = result.pos_match.matches,
                "POS report has duplicate rows for date, using the first"
            );
        }

        self.store.append(&result.record).await?;

        info!(
            id = %result.record.id,
            date = %result.record.date,
            cash_variance = %result.variances.cash,
            drawer_difference = %result.variances.drawer_difference,
            tally_perfect = result.variances.tally_perfect,
            "Audit recorded"
        );

        Ok(result)
    }

    /// Every stored record in append order.
    pub async fn history(&self) -> ServiceResult<Vec<AuditRecord>> {
        Ok(self.store.load_all().await?)
    }

    /// Summary of stored records, optionally limited to one month.
    pub async fn monthly_summary(&self, period: Option<ReportingPeriod>) -> ServiceResult<MonthlySummary> {
        let records = self.store.load_all().await?;
        Ok(MonthlySummary::from_records(&records, period, self.policy.tolerance))
    }

    /// Deletes all history.
    pub async fn reset(&self, _confirmation: ResetConfirmation) -> ServiceResult<()> {
        warn!("Resetting audit ledger");
        self.store.reset().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_phrase() {
        assert!(ResetConfirmation::parse("RESET").is_ok());
        assert!(ResetConfirmation::parse(" RESET\n").is_ok());
        assert!(ResetConfirmation::parse("reset").is_err());
        assert!(ResetConfirmation::parse("").is_err());
        assert!(ResetConfirmation::parse("RESET ALL").is_err());
    }
}
