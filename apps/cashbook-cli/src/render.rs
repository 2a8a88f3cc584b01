//! Terminal and JSON output for command results.

use std::io::{self, Write};

use cashbook_core::{
    AuditRecord, ChannelStatus, MatchKind, MonthlySummary, PaymentChannel, Reconciliation, Tolerance,
};
use serde::Serialize;

/// Output format chosen on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

impl Format {
    pub fn from_flag(json: bool) -> Self {
        if json {
            Format::Json
        } else {
            Format::Text
        }
    }
}

fn json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

fn status_label(status: ChannelStatus) -> &'static str {
    match status {
        ChannelStatus::Balanced => "OK",
        ChannelStatus::Shortage => "SHORT",
        ChannelStatus::Excess => "EXCESS",
    }
}

// =============================================================================
// Audit
// =============================================================================

/// Prints the result of one reconciliation.
pub fn reconciliation<W: Write>(out: &mut W, result: &Reconciliation, format: Format) -> io::Result<()> {
    if format == Format::Json {
        return json(out, result);
    }

    let record = &result.record;
    let variances = &result.variances;

    writeln!(out, "Audit {} for {}", record.id, record.date)?;
    if result.pos_match.kind == MatchKind::Contained {
        writeln!(out, "  matched POS row '{}'", result.pos_match.record.date)?;
    }
    if result.pos_match.has_duplicates() {
        writeln!(
            out,
            "  warning: {} POS rows share this date, the first was used",
            result.pos_match.matches
        )?;
    }
    writeln!(out)?;
    writeln!(out, "  {:<8} {:>14} {:>14} {:>14}  ", "Channel", "Actual", "Expected", "Variance")?;
    for channel in PaymentChannel::ALL {
        let (actual, expected) = match channel {
            PaymentChannel::Cash => (record.actual_cash, record.pos_cash_expected),
            PaymentChannel::Upi => (record.actual_upi, record.pos_upi_expected),
            PaymentChannel::Card => (record.actual_card, record.pos_card_expected),
        };
        writeln!(
            out,
            "  {:<8} {:>14} {:>14} {:>14}  {}",
            channel.to_string(),
            actual.to_string(),
            expected.to_string(),
            variances.channel(channel).to_string(),
            status_label(variances.status(channel)),
        )?;
    }
    writeln!(
        out,
        "  {:<8} {:>14} {:>14} {:>14}  {}",
        "Drawer",
        record.physical_drawer_total.to_string(),
        record.actual_cash.to_string(),
        variances.drawer_difference.to_string(),
        status_label(variances.drawer_status()),
    )?;
    writeln!(out)?;
    writeln!(out, "  Bank deposit: {}", record.bank_deposit)?;

    if variances.tally_perfect {
        writeln!(out, "  Tally perfect.")
    } else {
        writeln!(out, "  Discrepancy: cash and drawer do not tally.")
    }
}

// =============================================================================
// History
// =============================================================================

/// Prints every stored record, oldest first.
pub fn history<W: Write>(
    out: &mut W,
    records: &[AuditRecord],
    tolerance: Tolerance,
    format: Format,
) -> io::Result<()> {
    if format == Format::Json {
        return json(out, records);
    }

    if records.is_empty() {
        return writeln!(out, "No audits recorded yet.");
    }

    writeln!(
        out,
        "{:<12} {:<10} {:<12} {:>12} {:>12} {:>12} {:>12}  {}",
        "Date", "Shift", "Manager", "Cash var", "UPI var", "Card var", "Drawer", "Tally"
    )?;
    for record in records {
        let variances = record.variances(tolerance);
        writeln!(
            out,
            "{:<12} {:<10} {:<12} {:>12} {:>12} {:>12} {:>12}  {}",
            record.date.as_str(),
            record.shift.as_deref().unwrap_or("-"),
            record.manager.as_deref().unwrap_or("-"),
            variances.cash.to_string(),
            variances.upi.to_string(),
            variances.card.to_string(),
            variances.drawer_difference.to_string(),
            if variances.tally_perfect { "yes" } else { "no" },
        )?;
    }
    Ok(())
}

// =============================================================================
// Summary
// =============================================================================

/// Prints a monthly (or all-time) summary.
pub fn summary<W: Write>(out: &mut W, summary: &MonthlySummary, format: Format) -> io::Result<()> {
    if format == Format::Json {
        return json(out, summary);
    }

    match summary.period {
        Some(period) => writeln!(out, "Summary for {}", period)?,
        None => writeln!(out, "Summary for all history")?,
    }
    if summary.is_empty() {
        return writeln!(out, "  No audits in this period.");
    }

    writeln!(out, "  Audits:              {}", summary.records)?;
    writeln!(out, "  Tally-perfect days:  {}", summary.tally_perfect_days)?;
    writeln!(out, "  Net cash variance:   {}", summary.net_cash_variance)?;
    writeln!(out, "  Net UPI variance:    {}", summary.net_upi_variance)?;
    writeln!(out, "  Net card variance:   {}", summary.net_card_variance)?;
    writeln!(out, "  Net drawer diff:     {}", summary.net_drawer_difference)?;
    writeln!(out, "  Collections:         {}", summary.total_collections)?;
    writeln!(out, "  Bank deposits:       {}", summary.total_bank_deposit)?;
    if let Some(average) = summary.average_bill_value {
        writeln!(out, "  Average bill value:  {}", average)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cashbook_core::{reconcile, AuditPolicy, BusinessDate, ManagerEntry, Money, PosDataset, PosRecord};
    use chrono::Utc;

    fn shortage() -> Reconciliation {
        let date = BusinessDate::parse("01-03-2024").unwrap();
        let dataset = PosDataset::new(vec![PosRecord::new(
            date.clone(),
            Money::from_rupees(1000),
            Money::zero(),
            Money::zero(),
        )]);
        let mut entry = ManagerEntry::new(date);
        entry.actual_cash = Money::from_rupees(950);
        entry.denominations = entry
            .denominations
            .with(cashbook_core::Denomination::Note500, 2)
            .unwrap();
        reconcile(&dataset, &entry, &AuditPolicy::default(), Utc::now()).unwrap()
    }

    #[test]
    fn test_text_reconciliation_marks_shortage() {
        let mut out = Vec::new();
        reconciliation(&mut out, &shortage(), Format::Text).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("SHORT"));
        assert!(text.contains("-₹50.00"));
        assert!(text.contains("Discrepancy"));
    }

    #[test]
    fn test_json_reconciliation_is_valid_json() {
        let mut out = Vec::new();
        reconciliation(&mut out, &shortage(), Format::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert!(value["variances"]["tally_perfect"].is_boolean());
        assert!(value.get("record").is_some());
    }

    #[test]
    fn test_empty_history() {
        let mut out = Vec::new();
        history(&mut out, &[], Tolerance::DEFAULT, Format::Text).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No audits recorded yet.\n");
    }
}
