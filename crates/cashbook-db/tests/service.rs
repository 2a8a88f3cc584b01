//! End-to-end reconciliation through the service.

use cashbook_core::{
    AuditPolicy, BusinessDate, CoreError, Denomination, DuplicatePolicy, ManagerEntry, ManualMode, Money, PosDataset,
    PosRecord, ReportingPeriod,
};
use cashbook_db::{CsvLedger, Database, DbConfig, Ledger, ReconciliationService, ResetConfirmation, ServiceError};
use tempfile::TempDir;

fn date(s: &str) -> BusinessDate {
    BusinessDate::parse(s).unwrap()
}

fn dataset() -> PosDataset {
    let mut first = PosRecord::new(
        date("01-03-2024"),
        Money::from_rupees(1000),
        Money::from_rupees(500),
        Money::from_rupees(300),
    );
    first.total_bills = Some(10);
    first.total_price = Some(Money::from_rupees(1800));

    let second = PosRecord::new(
        date("02-03-2024"),
        Money::from_rupees(1000),
        Money::from_rupees(500),
        Money::from_rupees(300),
    );

    PosDataset::new(vec![first, second])
}

fn entry(day: &str, cash: i64) -> ManagerEntry {
    let mut entry = ManagerEntry::new(date(day));
    entry.manager = Some("Asha".to_string());
    entry.actual_cash = Money::from_rupees(cash);
    entry.actual_upi = Money::from_rupees(500);
    entry.actual_card = Money::from_rupees(300);
    entry.bank_deposit = Money::from_rupees(cash);
    entry.denominations = entry.denominations.with(Denomination::Note500, 2).unwrap();
    entry
}

async fn sqlite_service() -> ReconciliationService<Ledger> {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    ReconciliationService::new(Ledger::from(db.ledger()), AuditPolicy::default())
}

#[tokio::test]
async fn tally_perfect_audit_is_recorded() {
    let service = sqlite_service().await;

    let result = service.submit(&dataset(), &entry("01-03-2024", 1000)).await.unwrap();
    assert!(result.variances.tally_perfect);

    let history = service.history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, result.record.id);
    assert_eq!(history[0].pos_total_bills, Some(10));
}

#[tokio::test]
async fn shortage_audit_is_recorded_with_variances() {
    let service = sqlite_service().await;

    let result = service.submit(&dataset(), &entry("01-03-2024", 950)).await.unwrap();
    assert_eq!(result.variances.cash, Money::from_rupees(-50));
    assert_eq!(result.variances.drawer_difference, Money::from_rupees(50));
    assert!(!result.variances.tally_perfect);

    let stored = &service.history().await.unwrap()[0];
    assert_eq!(stored.cash_variance(), Money::from_rupees(-50));
    assert_eq!(stored.drawer_difference(), Money::from_rupees(50));
}

#[tokio::test]
async fn manual_sale_raises_expected_cash() {
    let service = sqlite_service().await;

    let mut manual = entry("01-03-2024", 1200);
    manual.manual_amount = Money::from_rupees(200);
    manual.manual_mode = ManualMode::Cash;
    manual.denominations = manual.denominations.with(Denomination::Note200, 1).unwrap();

    let result = service.submit(&dataset(), &manual).await.unwrap();
    assert_eq!(result.record.pos_cash_expected, Money::from_rupees(1200));
    assert!(result.variances.tally_perfect);
}

#[tokio::test]
async fn unknown_date_appends_nothing() {
    let service = sqlite_service().await;

    let err = service.submit(&dataset(), &entry("31-04-2024", 1000)).await.unwrap_err();
    assert!(matches!(err, ServiceError::Core(CoreError::DateNotFound { .. })));
    assert!(service.history().await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_rows_rejected_under_reject_policy() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let policy = AuditPolicy {
        duplicate_policy: DuplicatePolicy::Reject,
        ..Default::default()
    };
    let service = ReconciliationService::new(db.ledger(), policy);

    let mut rows = dataset().records().to_vec();
    rows.push(rows[0].clone());
    let duplicated = PosDataset::new(rows);

    let err = service.submit(&duplicated, &entry("01-03-2024", 1000)).await.unwrap_err();
    assert!(matches!(err, ServiceError::Core(CoreError::AmbiguousMatch { matches: 2, .. })));
    assert!(service.history().await.unwrap().is_empty());
}

#[tokio::test]
async fn monthly_summary_and_confirmed_reset() {
    let dir = TempDir::new().unwrap();
    let ledger = Ledger::from(CsvLedger::new(dir.path().join("ledger.csv")));
    let service = ReconciliationService::new(ledger, AuditPolicy::default());

    service.submit(&dataset(), &entry("01-03-2024", 1000)).await.unwrap();
    service.submit(&dataset(), &entry("02-03-2024", 950)).await.unwrap();

    let march: ReportingPeriod = "2024-03".parse().unwrap();
    let summary = service.monthly_summary(Some(march)).await.unwrap();
    assert_eq!(summary.records, 2);
    assert_eq!(summary.net_cash_variance, Money::from_rupees(-50));
    assert_eq!(summary.tally_perfect_days, 1);
    assert_eq!(summary.total_bank_deposit, Money::from_rupees(1950));
    assert_eq!(summary.average_bill_value, Some(Money::from_rupees(180)));

    let april: ReportingPeriod = "04-2024".parse().unwrap();
    assert!(service.monthly_summary(Some(april)).await.unwrap().is_empty());

    service.reset(ResetConfirmation::parse("RESET").unwrap()).await.unwrap();
    assert!(service.history().await.unwrap().is_empty());
}
