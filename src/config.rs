//! Configuration management for the library desk

use std::env;
use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding the CSV tables
    pub dir: PathBuf,
}

/// Borrowing rules applied by the loans engine
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoanPolicy {
    /// Maximum number of simultaneously borrowed books per user
    pub max_active: usize,
    /// Days a member has to pick a reserved book up
    pub collection_days: i64,
    /// Days a member has to bring the book back
    pub return_days: i64,
    /// Late fee per day, shown to members but never charged by the engine
    pub late_fee_per_day: Decimal,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    /// Optional directory for a daily rolling log file
    pub file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// Secret required to sign up with the Admin role
    pub admin_passkey: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub loans: LoanPolicy,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Environment variables, e.g. LIBRARY_DESK_LOANS__MAX_ACTIVE=3
            .add_source(
                Environment::with_prefix("LIBRARY_DESK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            // The signup screen historically read ADMIN_PASSKEY directly
            .set_override_option("auth.admin_passkey", env::var("ADMIN_PASSKEY").ok())?
            .build()?;

        config.try_deserialize()
    }

    /// Configuration rooted at the given data directory, everything else default
    pub fn with_data_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            data: DataConfig { dir: dir.into() },
            ..Self::default()
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
        }
    }
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self {
            max_active: 2,
            collection_days: 3,
            return_days: 45,
            late_fee_per_day: Decimal::new(2, 0),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}
