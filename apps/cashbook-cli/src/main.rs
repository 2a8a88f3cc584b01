//! # cashbook
//!
//! Close-of-day cash reconciliation from the command line.
//!
//! ## Commands
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cashbook audit   --pos report.csv --date 01-03-2024 --cash 950 ...    │
//! │       POS report + manager entry ──► variances ──► ledger append       │
//! │                                                                         │
//! │  cashbook history [--json]          every audit, oldest first          │
//! │  cashbook summary [--month 2024-03] net variances for a month          │
//! │  cashbook reset   --confirm RESET   wipe the ledger                    │
//! │  cashbook config  [--init]          show / write the configuration     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! ```text
//! cashbook-cli/
//! ├── main.rs        ◄─── You are here (argument parsing & dispatch)
//! ├── config.rs      ◄─── TOML + environment configuration
//! ├── pos_import.rs  ◄─── POS end-of-day CSV reader
//! ├── render.rs      ◄─── Text / JSON output
//! └── error.rs       ◄─── AppError and exit codes
//! ```

mod config;
mod error;
mod pos_import;
mod render;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cashbook_core::{
    BusinessDate, Denomination, DenominationCount, ManagerEntry, ManualMode, Money, ReportingPeriod, ValidationError,
};
use cashbook_db::{CsvLedger, Database, DbConfig, Ledger, ReconciliationService, ResetConfirmation};

use config::{CashbookConfig, LedgerBackend};
use error::AppError;
use render::Format;

// =============================================================================
// Arguments
// =============================================================================

#[derive(Parser)]
#[command(name = "cashbook")]
#[command(about = "Reconcile the day's cash, UPI and card takings against the POS report")]
#[command(version)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile one business date and append the result to the ledger
    Audit(AuditArgs),

    /// Show every recorded audit
    History {
        #[arg(long)]
        json: bool,
    },

    /// Net variances and collections for a month
    Summary {
        /// Month as YYYY-MM or MM-YYYY; omit for all history
        #[arg(long)]
        month: Option<ReportingPeriod>,

        #[arg(long)]
        json: bool,
    },

    /// Delete all audit history
    Reset {
        /// Must be exactly RESET
        #[arg(long, value_name = "PHRASE")]
        confirm: Option<String>,
    },

    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        init: bool,

        /// Overwrite an existing file with --init
        #[arg(long, requires = "init")]
        force: bool,
    },
}

#[derive(Args)]
struct AuditArgs {
    /// POS end-of-day export (CSV)
    #[arg(long, value_name = "FILE")]
    pos: PathBuf,

    /// Business date, e.g. 01-03-2024
    #[arg(long)]
    date: BusinessDate,

    #[arg(long)]
    shift: Option<String>,

    #[arg(long)]
    manager: Option<String>,

    /// Cash collected
    #[arg(long, value_parser = parse_money, allow_hyphen_values = true)]
    cash: Money,

    /// UPI / wallet settlement total
    #[arg(long, value_parser = parse_money, allow_hyphen_values = true, default_value = "0")]
    upi: Money,

    /// Card terminal batch total
    #[arg(long, value_parser = parse_money, allow_hyphen_values = true, default_value = "0")]
    card: Money,

    /// Sale billed outside the POS
    #[arg(long, value_parser = parse_money, allow_hyphen_values = true, default_value = "0")]
    manual_amount: Money,

    /// How the manual sale was paid: none, cash, upi, card
    #[arg(long, default_value = "none")]
    manual_mode: ManualMode,

    /// Cash sent to the bank
    #[arg(long, value_parser = parse_money, allow_hyphen_values = true, default_value = "0")]
    deposit: Money,

    #[command(flatten)]
    drawer: DrawerArgs,

    #[arg(long)]
    json: bool,
}

/// Physical drawer count.
#[derive(Args)]
struct DrawerArgs {
    #[arg(long = "note-500", default_value_t = 0, allow_hyphen_values = true)]
    note_500: i64,
    #[arg(long = "note-200", default_value_t = 0, allow_hyphen_values = true)]
    note_200: i64,
    #[arg(long = "note-100", default_value_t = 0, allow_hyphen_values = true)]
    note_100: i64,
    #[arg(long = "note-50", default_value_t = 0, allow_hyphen_values = true)]
    note_50: i64,
    #[arg(long = "note-20", default_value_t = 0, allow_hyphen_values = true)]
    note_20: i64,
    #[arg(long = "note-10", default_value_t = 0, allow_hyphen_values = true)]
    note_10: i64,
    #[arg(long = "coin-5", default_value_t = 0, allow_hyphen_values = true)]
    coin_5: i64,
    #[arg(long = "coin-2", default_value_t = 0, allow_hyphen_values = true)]
    coin_2: i64,
    #[arg(long = "coin-1", default_value_t = 0, allow_hyphen_values = true)]
    coin_1: i64,

    /// Loose coins counted by value instead of by piece
    #[arg(long, value_parser = parse_money, allow_hyphen_values = true, default_value = "0")]
    coin_total: Money,
}

impl DrawerArgs {
    fn count(&self) -> Result<DenominationCount, ValidationError> {
        let pieces = [
            (Denomination::Note500, self.note_500),
            (Denomination::Note200, self.note_200),
            (Denomination::Note100, self.note_100),
            (Denomination::Note50, self.note_50),
            (Denomination::Note20, self.note_20),
            (Denomination::Note10, self.note_10),
            (Denomination::Coin5, self.coin_5),
            (Denomination::Coin2, self.coin_2),
            (Denomination::Coin1, self.coin_1),
        ];
        pieces
            .into_iter()
            .try_fold(DenominationCount::default(), |count, (denomination, n)| {
                count.with(denomination, n)
            })?
            .with_coin_total(self.coin_total)
    }
}

fn parse_money(s: &str) -> Result<Money, String> {
    Money::parse_decimal(s).map_err(|e| e.to_string())
}

// =============================================================================
// Startup
// =============================================================================

/// Structured logging to stderr; `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cashbook=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Opens the configured ledger, creating its directory on first use.
async fn open_ledger(config: &CashbookConfig) -> Result<Ledger, AppError> {
    let path = config.ledger_path()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    info!(backend = %config.ledger.backend, path = %path.display(), "Opening ledger");

    match config.ledger.backend {
        LedgerBackend::Sqlite => {
            let db = Database::new(DbConfig::new(path)).await?;
            Ok(Ledger::from(db.ledger()))
        }
        LedgerBackend::Csv => Ok(Ledger::from(CsvLedger::new(path))),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = &err.hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(err.code.exit_code())
        }
    }
}

// =============================================================================
// Commands
// =============================================================================

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = CashbookConfig::load(cli.config.clone())?;
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Config { init, force } => cmd_config(&config, cli.config, init, force, &mut out),
        Commands::Audit(args) => {
            let service = ReconciliationService::new(open_ledger(&config).await?, config.audit_policy());
            cmd_audit(&service, args, &mut out).await
        }
        Commands::History { json } => {
            let service = ReconciliationService::new(open_ledger(&config).await?, config.audit_policy());
            let records = service.history().await?;
            render::history(&mut out, &records, service.policy().tolerance, Format::from_flag(json))?;
            Ok(())
        }
        Commands::Summary { month, json } => {
            let service = ReconciliationService::new(open_ledger(&config).await?, config.audit_policy());
            let summary = service.monthly_summary(month).await?;
            if !json {
                writeln!(out, "{}", config.store.name)?;
            }
            render::summary(&mut out, &summary, Format::from_flag(json))?;
            Ok(())
        }
        Commands::Reset { confirm } => {
            let phrase = confirm.ok_or_else(|| {
                AppError::usage("reset needs confirmation").with_hint("run `cashbook reset --confirm RESET`")
            })?;
            let confirmation = ResetConfirmation::parse(&phrase)?;
            let service = ReconciliationService::new(open_ledger(&config).await?, config.audit_policy());
            service.reset(confirmation).await?;
            writeln!(out, "Ledger cleared.")?;
            Ok(())
        }
    }
}

async fn cmd_audit<W: Write>(
    service: &ReconciliationService<Ledger>,
    args: AuditArgs,
    out: &mut W,
) -> Result<(), AppError> {
    let dataset = pos_import::read_pos_report(&args.pos)?;

    let mut entry = ManagerEntry::new(args.date);
    entry.shift = args.shift;
    entry.manager = args.manager;
    entry.actual_cash = args.cash;
    entry.actual_upi = args.upi;
    entry.actual_card = args.card;
    entry.manual_amount = args.manual_amount;
    entry.manual_mode = args.manual_mode;
    entry.bank_deposit = args.deposit;
    entry.denominations = args.drawer.count()?;

    let result = service.submit(&dataset, &entry).await?;
    render::reconciliation(out, &result, Format::from_flag(args.json))?;
    Ok(())
}

fn cmd_config<W: Write>(
    config: &CashbookConfig,
    path: Option<PathBuf>,
    init: bool,
    force: bool,
    out: &mut W,
) -> Result<(), AppError> {
    if init {
        let target = path
            .or_else(CashbookConfig::default_config_path)
            .ok_or(error::ConfigError::NoConfigPath)?;
        if target.exists() && !force {
            return Err(AppError::usage(format!("{} already exists", target.display()))
                .with_hint("pass --force to overwrite it"));
        }
        let saved = config.save(Some(target))?;
        writeln!(out, "Wrote {}", saved.display())?;
        return Ok(());
    }

    let text = toml::to_string_pretty(config).map_err(error::ConfigError::from)?;
    write!(out, "{}", text)?;
    writeln!(out, "# ledger file: {}", config.ledger_path()?.display())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_audit_arguments() {
        let cli = Cli::try_parse_from([
            "cashbook", "audit", "--pos", "pos.csv", "--date", "01-03-2024", "--cash", "950.50", "--manual-mode",
            "cash", "--manual-amount", "200", "--note-500", "2", "--coin-total", "3",
        ])
        .unwrap();

        let Commands::Audit(args) = cli.command else {
            panic!("expected audit");
        };
        assert_eq!(args.cash, Money::from_paise(95_050));
        assert_eq!(args.manual_mode, ManualMode::Cash);
        assert_eq!(args.upi, Money::zero());
        assert_eq!(args.drawer.count().unwrap().physical_total(), Money::from_rupees(1003));
    }

    #[test]
    fn test_negative_drawer_count_is_validation_error() {
        let cli = Cli::try_parse_from([
            "cashbook", "audit", "--pos", "pos.csv", "--date", "01-03-2024", "--cash", "0", "--note-100", "-1",
        ])
        .unwrap();
        let Commands::Audit(args) = cli.command else {
            panic!("expected audit");
        };
        let err: AppError = args.drawer.count().unwrap_err().into();
        assert_eq!(err.code.exit_code(), 2);
    }

    #[test]
    fn test_summary_month_formats() {
        for month in ["2024-03", "03-2024"] {
            let cli = Cli::try_parse_from(["cashbook", "summary", "--month", month]).unwrap();
            let Commands::Summary { month, .. } = cli.command else {
                panic!("expected summary");
            };
            assert_eq!(month.unwrap().to_string(), "2024-03");
        }
    }
}
