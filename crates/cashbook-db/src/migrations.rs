//! # Database Migrations
//!
//! Embedded SQL migrations for the SQLite ledger.
//!
//! ## Adding New Migrations
//!
//! 1. Create a new file in `migrations/sqlite/` with the next sequence number
//! 2. Name format: `NNN_description.sql`
//! 3. **NEVER** modify existing migrations - always add new ones
//! 4. Adding a ledger column also means extending `LEDGER_COLUMNS` and the
//!    CSV backend, or loads will report a schema mismatch

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// Embedded migrations from the `migrations/sqlite` directory.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// DDL for the current `audit_ledger` table and its index.
///
/// Shared with [`SqliteLedger`](crate::SqliteLedger)'s reset, which rebuilds
/// the table so a ledger left behind by an older layout becomes usable again.
pub(crate) const AUDIT_LEDGER_DDL: &str = include_str!("../../../migrations/sqlite/001_audit_ledger.sql");

/// Runs all pending database migrations.
///
/// Idempotent; each migration runs in its own transaction, in filename order.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!(total = MIGRATOR.migrations.len(), "All migrations applied successfully");
    Ok(())
}
