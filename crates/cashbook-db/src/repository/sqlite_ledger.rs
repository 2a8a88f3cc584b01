//! # SQLite Ledger
//!
//! The `audit_ledger` table as a [`LedgerStore`].
//!
//! ## Append Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  append(record)                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN ── INSERT one row (seq assigned by AUTOINCREMENT) ── COMMIT      │
//! │                                                                         │
//! │  Two writers never interleave: SQLite grants one write lock at a time  │
//! │  and the other waits up to busy_timeout. A failed INSERT rolls back,   │
//! │  leaving the ledger exactly as it was.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info, warn};

use cashbook_core::audit::missing_columns;
use cashbook_core::{AuditRecord, BusinessDate, ManualMode, Money};

use crate::error::{DbError, DbResult};
use crate::ledger::LedgerStore;
use crate::migrations::AUDIT_LEDGER_DDL;

const SELECT_ALL: &str = r#"
    SELECT
        id, date, shift, manager,
        actual_cash, pos_cash_expected,
        actual_upi, pos_upi_expected,
        actual_card, pos_card_expected,
        physical_drawer_total, bank_deposit,
        manual_amount, manual_mode,
        pos_total_bills, pos_total_sales,
        timestamp
    FROM audit_ledger
    ORDER BY seq ASC
"#;

/// Ledger stored in SQLite.
#[derive(Debug, Clone)]
pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    /// Creates a new SqliteLedger.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteLedger { pool }
    }

    /// Verifies `audit_ledger` has every schema column.
    async fn check_schema(&self) -> DbResult<()> {
        let columns: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_table_info('audit_ledger')")
            .fetch_all(&self.pool)
            .await?;

        let missing = missing_columns(columns.iter().map(String::as_str));
        if !missing.is_empty() {
            warn!(?missing, "Ledger table is missing columns");
            return Err(DbError::SchemaMismatch { missing });
        }
        Ok(())
    }

    /// Number of stored records.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_ledger")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

impl LedgerStore for SqliteLedger {
    async fn append(&self, record: &AuditRecord) -> DbResult<()> {
        debug!(id = %record.id, date = %record.date, "Appending audit record");
        self.check_schema().await?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO audit_ledger (
                id, date, shift, manager,
                actual_cash, pos_cash_expected,
                actual_upi, pos_upi_expected,
                actual_card, pos_card_expected,
                physical_drawer_total, bank_deposit,
                manual_amount, manual_mode,
                pos_total_bills, pos_total_sales,
                timestamp
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6,
                ?7, ?8,
                ?9, ?10,
                ?11, ?12,
                ?13, ?14,
                ?15, ?16,
                ?17
            )
            "#,
        )
        .bind(&record.id)
        .bind(record.date.as_str())
        .bind(record.shift.as_deref())
        .bind(record.manager.as_deref())
        .bind(record.actual_cash.paise())
        .bind(record.pos_cash_expected.paise())
        .bind(record.actual_upi.paise())
        .bind(record.pos_upi_expected.paise())
        .bind(record.actual_card.paise())
        .bind(record.pos_card_expected.paise())
        .bind(record.physical_drawer_total.paise())
        .bind(record.bank_deposit.paise())
        .bind(record.manual_amount.paise())
        .bind(record.manual_mode)
        .bind(record.pos_total_bills)
        .bind(record.pos_total_sales.map(|m| m.paise()))
        .bind(record.timestamp)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn load_all(&self) -> DbResult<Vec<AuditRecord>> {
        self.check_schema().await?;

        let rows = sqlx::query(SELECT_ALL).fetch_all(&self.pool).await?;
        let records = rows
            .iter()
            .enumerate()
            .map(|(i, row)| record_from_row(row, i + 1))
            .collect::<DbResult<Vec<_>>>()?;

        debug!(count = records.len(), "Loaded ledger");
        Ok(records)
    }

    /// Drops and recreates `audit_ledger` in one transaction.
    ///
    /// Rebuilding rather than deleting rows also clears a table written by
    /// an older layout, which would otherwise keep failing the schema check.
    async fn reset(&self) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DROP TABLE IF EXISTS audit_ledger").execute(&mut *tx).await?;
        sqlx::Executor::execute(&mut *tx, sqlx::raw_sql(AUDIT_LEDGER_DDL)).await?;
        tx.commit().await?;

        info!("Ledger reset");
        Ok(())
    }
}

/// Maps one row; `index` is the 1-based position used in error messages.
fn record_from_row(row: &SqliteRow, index: usize) -> DbResult<AuditRecord> {
    let invalid = |e: sqlx::Error| DbError::invalid_record(index, e.to_string());
    let money = |column: &str| -> DbResult<Money> {
        row.try_get::<i64, _>(column).map(Money::from_paise).map_err(invalid)
    };

    let date: String = row.try_get("date").map_err(invalid)?;
    let date = BusinessDate::parse(&date).map_err(|e| DbError::invalid_record(index, e.to_string()))?;

    let manual_mode: ManualMode = row.try_get("manual_mode").map_err(invalid)?;
    let pos_total_sales: Option<i64> = row.try_get("pos_total_sales").map_err(invalid)?;
    let timestamp: DateTime<Utc> = row.try_get("timestamp").map_err(invalid)?;

    Ok(AuditRecord {
        id: row.try_get("id").map_err(invalid)?,
        date,
        shift: row.try_get("shift").map_err(invalid)?,
        manager: row.try_get("manager").map_err(invalid)?,
        actual_cash: money("actual_cash")?,
        pos_cash_expected: money("pos_cash_expected")?,
        actual_upi: money("actual_upi")?,
        pos_upi_expected: money("pos_upi_expected")?,
        actual_card: money("actual_card")?,
        pos_card_expected: money("pos_card_expected")?,
        physical_drawer_total: money("physical_drawer_total")?,
        bank_deposit: money("bank_deposit")?,
        manual_amount: money("manual_amount")?,
        manual_mode,
        pos_total_bills: row.try_get("pos_total_bills").map_err(invalid)?,
        pos_total_sales: pos_total_sales.map(Money::from_paise),
        timestamp,
    })
}
