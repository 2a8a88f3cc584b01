//! # POS Report Import
//!
//! Reads the POS end-of-day export into a [`PosDataset`].
//!
//! ## Expected Columns
//! ```text
//! ┌──────────────────────┬──────────┬────────────────────────────────────┐
//! │ Column               │ Required │ Maps to                            │
//! ├──────────────────────┼──────────┼────────────────────────────────────┤
//! │ Date                 │ yes (*)  │ PosRecord.date                     │
//! │ ReceivedCashAmount   │ yes      │ PosRecord.received_cash            │
//! │ WalletAmount         │ yes      │ PosRecord.wallet_amount            │
//! │ CardAmount           │ yes      │ PosRecord.card_amount              │
//! │ TotalBills           │ no       │ PosRecord.total_bills              │
//! │ TotalPrice           │ no       │ PosRecord.total_price              │
//! └──────────────────────┴──────────┴────────────────────────────────────┘
//!  (*) exports without a Date header carry the date in the first column
//! ```
//!
//! Headers are trimmed and matched case-insensitively. A blank required
//! amount is an error, never zero.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use cashbook_core::{BusinessDate, Money, PosDataset, PosRecord};
use csv::StringRecord;
use thiserror::Error;
use tracing::{debug, info};

const DATE: &str = "Date";
const RECEIVED_CASH: &str = "ReceivedCashAmount";
const WALLET: &str = "WalletAmount";
const CARD: &str = "CardAmount";
const TOTAL_BILLS: &str = "TotalBills";
const TOTAL_PRICE: &str = "TotalPrice";

/// Errors reading a POS report.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Could not read POS report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed POS report: {0}")]
    Csv(#[from] csv::Error),

    #[error("POS report is missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Row {row}: invalid {column} '{value}'")]
    InvalidAmount { row: usize, column: String, value: String },

    #[error("Row {row}: date is blank")]
    BlankDate { row: usize },
}

/// Reads the report at `path`.
pub fn read_pos_report(path: &Path) -> Result<PosDataset, ImportError> {
    info!(path = %path.display(), "Reading POS report");
    let dataset = parse_pos_report(File::open(path)?)?;
    info!(rows = dataset.len(), "POS report loaded");
    Ok(dataset)
}

/// Column positions resolved from the header row.
struct Columns {
    date: usize,
    cash: usize,
    wallet: usize,
    card: usize,
    bills: Option<usize>,
    price: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, ImportError> {
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

        let required = [RECEIVED_CASH, WALLET, CARD];
        let mut missing: Vec<String> = required
            .iter()
            .filter(|name| find(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if headers.is_empty() {
            missing.insert(0, DATE.to_string());
        }

        match (find(RECEIVED_CASH), find(WALLET), find(CARD)) {
            (Some(cash), Some(wallet), Some(card)) if missing.is_empty() => Ok(Columns {
                date: find(DATE).unwrap_or(0),
                cash,
                wallet,
                card,
                bills: find(TOTAL_BILLS),
                price: find(TOTAL_PRICE),
            }),
            _ => Err(ImportError::MissingColumns(missing)),
        }
    }
}

/// Parses a report from any reader.
pub fn parse_pos_report<R: Read>(input: R) -> Result<PosDataset, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let columns = Columns::resolve(&headers)?;

    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row?;
        let number = i + 1;

        if row.iter().all(str::is_empty) {
            debug!(row = number, "Skipping blank row");
            continue;
        }

        let date = BusinessDate::parse(row.get(columns.date).unwrap_or(""))
            .map_err(|_| ImportError::BlankDate { row: number })?;

        let mut record = PosRecord::new(
            date,
            amount(&row, columns.cash, RECEIVED_CASH, number)?,
            amount(&row, columns.wallet, WALLET, number)?,
            amount(&row, columns.card, CARD, number)?,
        );
        record.total_price = columns
            .price
            .filter(|&c| !row.get(c).unwrap_or("").is_empty())
            .map(|c| amount(&row, c, TOTAL_PRICE, number))
            .transpose()?;
        record.total_bills = columns
            .bills
            .filter(|&c| !row.get(c).unwrap_or("").is_empty())
            .map(|c| bill_count(&row, c, number))
            .transpose()?;

        records.push(record);
    }

    Ok(PosDataset::new(records))
}

fn amount(row: &StringRecord, column: usize, name: &str, number: usize) -> Result<Money, ImportError> {
    let value = row.get(column).unwrap_or("");
    Money::parse_decimal(value).map_err(|_| ImportError::InvalidAmount {
        row: number,
        column: name.to_string(),
        value: value.to_string(),
    })
}

/// Whole bill counts; spreadsheet exports sometimes write them as `42.0`.
fn bill_count(row: &StringRecord, column: usize, number: usize) -> Result<i64, ImportError> {
    let parsed = amount(row, column, TOTAL_BILLS, number)?;
    if parsed.paise_part() != 0 || parsed.is_negative() {
        return Err(ImportError::InvalidAmount {
            row: number,
            column: TOTAL_BILLS.to_string(),
            value: row.get(column).unwrap_or("").to_string(),
        });
    }
    Ok(parsed.rupees())
}

// =============================================================================
// Unit Tests
// =============================================================================
