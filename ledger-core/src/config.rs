//! Configuration for the ledger

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backing JSON file holding every account
    pub data_file: PathBuf,

    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Statement rendering
    pub statement: StatementConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("./data/accounts.json"),
            service_name: "account-ledger".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            statement: StatementConfig::default(),
        }
    }
}

/// Statement rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementConfig {
    /// chrono format string for dates
    pub date_format: String,

    /// Width of the separator line under the header
    pub ruler_width: usize,
}

impl Default for StatementConfig {
    fn default() -> Self {
        Self {
            date_format: "%d.%m.%Y %H:%M:%S".to_string(),
            ruler_width: 80,
        }
    }
}

impl StatementConfig {
    /// Reject date formats chrono cannot render
    pub fn validate(&self) -> crate::Result<()> {
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(crate::Error::Config(format!(
                "Invalid statement date format: {:?}",
                self.date_format
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Check values that cannot be enforced by the types alone
    pub fn validate(&self) -> crate::Result<()> {
        if self.data_file.as_os_str().is_empty() {
            return Err(crate::Error::Config("data_file must not be empty".to_string()));
        }
        self.statement.validate()
    }

    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::Config(format!("Failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(data_file) = std::env::var("LEDGER_DATA_FILE") {
            if data_file.trim().is_empty() {
                return Err(crate::Error::Config(
                    "LEDGER_DATA_FILE must not be empty".to_string(),
                ));
            }
            config.data_file = PathBuf::from(data_file);
        }

        if let Ok(format) = std::env::var("LEDGER_DATE_FORMAT") {
            config.statement.date_format = format;
        }

        config.validate()?;
        Ok(config)
    }
}
