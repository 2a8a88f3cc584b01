//! # CSV Ledger
//!
//! A delimited file as a [`LedgerStore`], for stores that want a ledger they
//! can open in a spreadsheet.
//!
//! ## File Layout
//! ```text
//! id,date,shift,manager,actual_cash,pos_cash_expected,...,timestamp   ← header, written once
//! 6f1c…,01-03-2024,,Asha,950.00,1000.00,...,2024-03-01T21:04:11+00:00
//! 9a20…,02-03-2024,Morning,Ravi,1000.00,1000.00,...,2024-03-02T21:10:52+00:00
//! ```
//!
//! Money is written as rupees with two decimals and read back exactly.
//!
//! ## Concurrency
//! Every operation holds an OS-level lock on the ledger file (`flock` /
//! `LockFileEx` via `fd-lock`): appends and resets take it exclusively,
//! loads take it shared. The header check, the optional header and the row
//! are written under one exclusive lock, so independent handles, and other
//! processes, never write a second header or interleave rows. Handles cloned
//! from one another also queue on an in-process mutex before blocking a
//! worker thread on the file lock.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use csv::StringRecord;
use fd_lock::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use cashbook_core::audit::missing_columns;
use cashbook_core::{AuditRecord, BusinessDate, ManualMode, Money, LEDGER_COLUMNS};

use crate::error::{DbError, DbResult};
use crate::ledger::LedgerStore;

/// Spreadsheet tools prepend this when re-saving as UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Ledger stored in a CSV file.
#[derive(Debug, Clone)]
pub struct CsvLedger {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl CsvLedger {
    /// Creates a ledger at `path`. Nothing is touched until the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvLedger {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs blocking file work on tokio's blocking pool.
    async fn blocking<T, F>(&self, work: F) -> DbResult<T>
    where
        T: Send + 'static,
        F: FnOnce(PathBuf) -> DbResult<T> + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || work(path))
            .await
            .map_err(|e| DbError::Internal(format!("ledger task failed: {e}")))?
    }
}

impl LedgerStore for CsvLedger {
    async fn append(&self, record: &AuditRecord) -> DbResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());
        writer.write_record(to_row(record))?;
        let row = writer.into_inner().map_err(|e| DbError::Storage(e.to_string()))?;

        let wrote_header = self.blocking(move |path| append_locked(&path, &row)).await?;

        debug!(id = %record.id, date = %record.date, header = wrote_header, "Appended audit record to CSV ledger");
        Ok(())
    }

    async fn load_all(&self) -> DbResult<Vec<AuditRecord>> {
        let Some(bytes) = self.blocking(|path| read_locked(&path)).await? else {
            debug!(path = %self.path.display(), "No CSV ledger yet");
            return Ok(Vec::new());
        };

        let bytes = strip_bom(&bytes);
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(bytes);

        let header = reader.headers()?.clone();
        ensure_columns(&header)?;

        let positions: HashMap<&str, usize> = header.iter().enumerate().map(|(i, h)| (h, i)).collect();

        let mut records = Vec::new();
        for (i, row) in reader.records().enumerate() {
            let row = row?;
            records.push(from_row(&row, &positions, i + 1)?);
        }

        debug!(count = records.len(), "Loaded CSV ledger");
        Ok(records)
    }

    /// Truncates the file under the exclusive lock.
    ///
    /// The file is emptied rather than removed so a writer already holding
    /// it open cannot append into an unlinked inode.
    async fn reset(&self) -> DbResult<()> {
        let _guard = self.write_lock.lock().await;

        let cleared = self
            .blocking(|path| {
                let file = match OpenOptions::new().write(true).open(&path) {
                    Ok(file) => file,
                    Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
                    Err(e) => return Err(e.into()),
                };
                let mut lock = RwLock::new(file);
                let file = lock.write()?;
                file.set_len(0)?;
                file.sync_all()?;
                Ok(true)
            })
            .await?;

        if cleared {
            info!(path = %self.path.display(), "CSV ledger reset");
        }
        Ok(())
    }
}

/// Appends `row` under an exclusive file lock, writing the header first
/// when the file is empty. Returns whether the header was written.
fn append_locked(path: &Path, row: &[u8]) -> DbResult<bool> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().read(true).append(true).create(true).open(path)?;
    let mut lock = RwLock::new(file);
    let mut file = lock.write()?;

    let is_new = file.metadata()?.len() == 0;
    if !is_new {
        check_existing_header(&*file)?;
    }

    let mut bytes = Vec::with_capacity(row.len() + 256);
    if is_new {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(&mut bytes);
        writer.write_record(LEDGER_COLUMNS)?;
        writer.flush()?;
        drop(writer);
    }
    bytes.extend_from_slice(row);

    file.write_all(&bytes)?;
    file.flush()?;
    Ok(is_new)
}

/// Reads the whole file under a shared lock; `None` when it does not exist.
fn read_locked(path: &Path) -> DbResult<Option<Vec<u8>>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let lock = RwLock::new(file);
    let file = lock.read()?;

    let mut bytes = Vec::new();
    (&*file).read_to_end(&mut bytes)?;
    Ok(Some(bytes))
}

/// Checks the header line of an existing, non-empty file.
fn check_existing_header(mut file: &File) -> DbResult<()> {
    file.seek(SeekFrom::Start(0))?;
    let mut first_line = Vec::new();
    BufReader::new(file).read_until(b'\n', &mut first_line)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(strip_bom(&first_line));
    let header = reader.records().next().transpose()?.unwrap_or_default();

    ensure_columns(&header)
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

fn ensure_columns(header: &StringRecord) -> DbResult<()> {
    let missing = missing_columns(header.iter());
    if missing.is_empty() {
        Ok(())
    } else {
        warn!(?missing, "CSV ledger header is missing columns");
        Err(DbError::SchemaMismatch { missing })
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

/// Fields in `LEDGER_COLUMNS` order.
fn to_row(record: &AuditRecord) -> Vec<String> {
    vec![
        record.id.clone(),
        record.date.to_string(),
        record.shift.clone().unwrap_or_default(),
        record.manager.clone().unwrap_or_default(),
        record.actual_cash.to_decimal_string(),
        record.pos_cash_expected.to_decimal_string(),
        record.actual_upi.to_decimal_string(),
        record.pos_upi_expected.to_decimal_string(),
        record.actual_card.to_decimal_string(),
        record.pos_card_expected.to_decimal_string(),
        record.physical_drawer_total.to_decimal_string(),
        record.bank_deposit.to_decimal_string(),
        record.manual_amount.to_decimal_string(),
        record.manual_mode.to_string(),
        record.pos_total_bills.map(|b| b.to_string()).unwrap_or_default(),
        record.pos_total_sales.map(|m| m.to_decimal_string()).unwrap_or_default(),
        record.timestamp.to_rfc3339(),
    ]
}

/// Field access for one data row; `index` is the 1-based row number.
struct RowFields<'a> {
    row: &'a StringRecord,
    positions: &'a HashMap<&'a str, usize>,
    index: usize,
}

impl<'a> RowFields<'a> {
    fn field(&self, column: &str) -> &'a str {
        self.positions.get(column).and_then(|&i| self.row.get(i)).unwrap_or("")
    }

    fn optional(&self, column: &str) -> Option<String> {
        let value = self.field(column);
        (!value.is_empty()).then(|| value.to_string())
    }

    /// Blank money is an error, never zero.
    fn money(&self, column: &str) -> DbResult<Money> {
        let value = self.field(column);
        if value.is_empty() {
            return Err(self.invalid(format!("{column} is blank")));
        }
        Money::parse_decimal(value).map_err(|e| self.invalid(format!("{column}: {e}")))
    }

    fn invalid(&self, reason: impl Into<String>) -> DbError {
        DbError::invalid_record(self.index, reason)
    }
}

fn from_row(row: &StringRecord, positions: &HashMap<&str, usize>, index: usize) -> DbResult<AuditRecord> {
    let fields = RowFields { row, positions, index };

    let id = fields.optional("id").ok_or_else(|| fields.invalid("id is blank"))?;
    let date = BusinessDate::parse(fields.field("date")).map_err(|e| fields.invalid(e.to_string()))?;
    let manual_mode: ManualMode = fields
        .field("manual_mode")
        .parse()
        .map_err(|e| fields.invalid(format!("manual_mode: {e}")))?;

    let pos_total_bills = fields
        .optional("pos_total_bills")
        .map(|v| v.parse::<i64>())
        .transpose()
        .map_err(|e| fields.invalid(format!("pos_total_bills: {e}")))?;
    let pos_total_sales = match fields.optional("pos_total_sales") {
        Some(_) => Some(fields.money("pos_total_sales")?),
        None => None,
    };

    let timestamp = DateTime::parse_from_rfc3339(fields.field("timestamp"))
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| fields.invalid(format!("timestamp: {e}")))?;

    Ok(AuditRecord {
        id,
        date,
        shift: fields.optional("shift"),
        manager: fields.optional("manager"),
        actual_cash: fields.money("actual_cash")?,
        pos_cash_expected: fields.money("pos_cash_expected")?,
        actual_upi: fields.money("actual_upi")?,
        pos_upi_expected: fields.money("pos_upi_expected")?,
        actual_card: fields.money("actual_card")?,
        pos_card_expected: fields.money("pos_card_expected")?,
        physical_drawer_total: fields.money("physical_drawer_total")?,
        bank_deposit: fields.money("bank_deposit")?,
        manual_amount: fields.money("manual_amount")?,
        manual_mode,
        pos_total_bills,
        pos_total_sales,
        timestamp,
    })
}
