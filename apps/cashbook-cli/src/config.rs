//! # Cashbook Configuration
//!
//! Where the ledger lives and which audit rules apply.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CASHBOOK_LEDGER_BACKEND=csv                                        │
//! │     CASHBOOK_LEDGER_PATH=/srv/cashbook/ledger.csv                      │
//! │     CASHBOOK_TOLERANCE_PAISE=1                                         │
//! │     CASHBOOK_REQUIRE_MANAGER=true                                      │
//! │                                                                         │
//! │  2. TOML Config File (--config, or the platform default)              │
//! │     ~/.config/cashbook/cashbook.toml (Linux)                           │
//! │     ~/Library/Application Support/com.cashbook.cashbook/... (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     SQLite ledger in the platform data dir, 1 paisa tolerance          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! name = "Main Road Branch"
//!
//! [ledger]
//! backend = "sqlite"   # sqlite | csv
//! path = "/srv/cashbook/ledger.db"
//!
//! [audit]
//! tolerance_paise = 1
//! require_manager = true
//! duplicate_policy = "first"   # first | reject
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use cashbook_core::{AuditPolicy, DuplicatePolicy, Money, Tolerance};

use crate::error::{ConfigError, ConfigResult};

/// Largest tolerance accepted; anything above ₹1 hides real shortages.
const MAX_TOLERANCE_PAISE: i64 = 100;

// =============================================================================
// Ledger Backend
// =============================================================================

/// Where audit records are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerBackend {
    /// `ledger.db`, one row per audit.
    #[default]
    Sqlite,

    /// `ledger.csv`, readable in a spreadsheet.
    Csv,
}

impl LedgerBackend {
    fn default_file_name(&self) -> &'static str {
        match self {
            LedgerBackend::Sqlite => "ledger.db",
            LedgerBackend::Csv => "ledger.csv",
        }
    }
}

impl std::fmt::Display for LedgerBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerBackend::Sqlite => write!(f, "sqlite"),
            LedgerBackend::Csv => write!(f, "csv"),
        }
    }
}

impl std::str::FromStr for LedgerBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" | "db" => Ok(LedgerBackend::Sqlite),
            "csv" => Ok(LedgerBackend::Csv),
            other => Err(ConfigError::Invalid(format!(
                "Unknown ledger backend: '{}'. Valid options: sqlite, csv",
                other
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// The store the cashbook belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Shown in report headers.
    #[serde(default = "default_store_name")]
    pub name: String,
}

fn default_store_name() -> String {
    "My Store".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
        }
    }
}

/// Ledger location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerSettings {
    #[serde(default)]
    pub backend: LedgerBackend,

    /// Ledger file. Defaults to the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Rules applied to every reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSettings {
    /// Rounding tolerance in paise for every zero check.
    #[serde(default = "default_tolerance_paise")]
    pub tolerance_paise: i64,

    /// Refuse audits without a manager name.
    #[serde(default)]
    pub require_manager: bool,

    /// What to do when the POS report has several rows for a date.
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
}

fn default_tolerance_paise() -> i64 {
    1
}

impl Default for AuditSettings {
    fn default() -> Self {
        AuditSettings {
            tolerance_paise: default_tolerance_paise(),
            require_manager: false,
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete cashbook configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CashbookConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub ledger: LedgerSettings,

    #[serde(default)]
    pub audit: AuditSettings,
}

impl CashbookConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Writes the configuration, creating parent directories.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoConfigPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(path)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(0..=MAX_TOLERANCE_PAISE).contains(&self.audit.tolerance_paise) {
            return Err(ConfigError::Invalid(format!(
                "tolerance_paise must be between 0 and {}, got {}",
                MAX_TOLERANCE_PAISE, self.audit.tolerance_paise
            )));
        }

        if let Some(path) = &self.ledger.path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid("ledger path is empty".into()));
            }
        }

        Ok(())
    }

    /// Applies `CASHBOOK_*` environment overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(backend) = var("CASHBOOK_LEDGER_BACKEND") {
            match backend.parse() {
                Ok(parsed) => {
                    debug!(backend = %backend, "Overriding ledger backend from environment");
                    self.ledger.backend = parsed;
                }
                Err(_) => warn!(backend = %backend, "Unknown ledger backend in environment"),
            }
        }

        if let Some(path) = var("CASHBOOK_LEDGER_PATH") {
            debug!(path = %path, "Overriding ledger path from environment");
            self.ledger.path = Some(PathBuf::from(path));
        }

        if let Some(tolerance) = var("CASHBOOK_TOLERANCE_PAISE") {
            match tolerance.trim().parse::<i64>() {
                Ok(paise) => self.audit.tolerance_paise = paise,
                Err(_) => warn!(tolerance = %tolerance, "Invalid tolerance in environment"),
            }
        }

        if let Some(flag) = var("CASHBOOK_REQUIRE_MANAGER") {
            match flag.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => self.audit.require_manager = true,
                "0" | "false" | "no" => self.audit.require_manager = false,
                _ => warn!(value = %flag, "Invalid CASHBOOK_REQUIRE_MANAGER in environment"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "cashbook", "cashbook")
            .map(|dirs| dirs.config_dir().join("cashbook.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// The configured ledger file, or the backend's default in the data dir.
    pub fn ledger_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.ledger.path {
            return Ok(path.clone());
        }
        let file = self.ledger.backend.default_file_name();
        directories::ProjectDirs::from("com", "cashbook", "cashbook")
            .map(|dirs| dirs.data_dir().join(file))
            .ok_or_else(|| ConfigError::NoDataDir(PathBuf::from(file)))
    }

    /// Audit rules for the reconciliation service.
    pub fn audit_policy(&self) -> AuditPolicy {
        AuditPolicy {
            require_manager: self.audit.require_manager,
            duplicate_policy: self.audit.duplicate_policy,
            tolerance: Tolerance::new(Money::from_paise(self.audit.tolerance_paise)),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
