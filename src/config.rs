//! Configuration for the rate pipeline
//!
//! Everything has a default, so an empty TOML file (or no file at all) gives
//! the stock setup: CHF, USD and EUR quoted in PLN from NBP table A, with
//! EUR/USD and CHF/USD derived.
//!
//! ```toml
//! [tracked]
//! base = "PLN"
//! currencies = ["chf", "usd", "eur"]
//! lookback_days = 30
//!
//! [store]
//! separator = ";"
//! decimal = ","
//!
//! [[derived]]
//! numerator = "EUR/PLN"
//! denominator = "USD/PLN"
//! output = "EUR/USD"
//! ```

use crate::currency::{CurrencyCode, CurrencyPair};
use crate::data::derive::DerivedRate;
use crate::data::sources::nbp::MAX_LOOKBACK_DAYS;
use crate::data::store::{validate_file_name, CsvFormat};
use crate::error::{RatesError, Result};
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatesConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub tracked: TrackedConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default = "default_derived")]
    pub derived: Vec<DerivedRate>,
}

/// Remote quote endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Which currencies are fetched and how
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedConfig {
    #[serde(default = "default_base")]
    pub base: CurrencyCode,
    #[serde(default = "default_currencies")]
    pub currencies: Vec<CurrencyCode>,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    /// 1 fetches sequentially
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
}

/// Where and how tables are persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default = "default_decimal")]
    pub decimal: String,
    #[serde(default = "default_all_file_name")]
    pub all_file_name: String,
    #[serde(default = "default_selected_file_name")]
    pub selected_file_name: String,
}

fn default_endpoint() -> String {
    "https://api.nbp.pl/api/exchangerates/rates".to_string()
}

fn default_table() -> String {
    "a".to_string()
}

fn default_format() -> String {
    "json".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("rusty-rates/{}", env!("CARGO_PKG_VERSION"))
}

fn default_base() -> CurrencyCode {
    CurrencyCode("PLN".to_string())
}

fn default_currencies() -> Vec<CurrencyCode> {
    ["CHF", "USD", "EUR"]
        .into_iter()
        .map(|c| CurrencyCode(c.to_string()))
        .collect()
}

fn default_lookback_days() -> u32 {
    30
}

fn default_max_concurrent_fetches() -> usize {
    3
}

fn default_data_dir() -> PathBuf {
    default_home().join("data")
}

fn default_separator() -> String {
    ",".to_string()
}

fn default_decimal() -> String {
    ".".to_string()
}

fn default_all_file_name() -> String {
    "all_currency_data.csv".to_string()
}

fn default_selected_file_name() -> String {
    "selected_currency_data.csv".to_string()
}

fn default_derived() -> Vec<DerivedRate> {
    vec![
        DerivedRate::new("EUR/PLN", "USD/PLN", "EUR/USD"),
        DerivedRate::new("CHF/PLN", "USD/PLN", "CHF/USD"),
    ]
}

fn default_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".rusty-rates")
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            table: default_table(),
            format: default_format(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for TrackedConfig {
    fn default() -> Self {
        Self {
            base: default_base(),
            currencies: default_currencies(),
            lookback_days: default_lookback_days(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            separator: default_separator(),
            decimal: default_decimal(),
            all_file_name: default_all_file_name(),
            selected_file_name: default_selected_file_name(),
        }
    }
}

impl StoreConfig {
    pub fn format(&self) -> CsvFormat {
        CsvFormat::new(&self.separator, &self.decimal)
    }
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            tracked: TrackedConfig::default(),
            store: StoreConfig::default(),
            derived: default_derived(),
        }
    }
}

impl RatesConfig {
    /// Default config file location: `~/.rusty-rates/config.toml`
    pub fn default_path() -> PathBuf {
        default_home().join("config.toml")
    }

    /// Parse from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| RatesError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Load from an explicit path, or the default location if it exists
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(config_path) => {
                let contents = fs::read_to_string(config_path).map_err(|e| {
                    RatesError::ConfigError(format!(
                        "Failed to read config {}: {}",
                        config_path.display(),
                        e
                    ))
                })?;
                Self::from_toml_str(&contents)?
            }
            None => {
                let default_config = Self::default_path();
                if default_config.exists() {
                    log::debug!("Loading config from {}", default_config.display());
                    Self::from_toml_str(&fs::read_to_string(&default_config)?)?
                } else {
                    Self::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Column names produced by fetching, e.g. "USD/PLN", in tracked order
    pub fn fetched_pairs(&self) -> Vec<String> {
        self.tracked
            .currencies
            .iter()
            .map(|code| CurrencyPair::new(code.clone(), self.tracked.base.clone()).column_name())
            .collect()
    }

    /// Every column a refresh produces: fetched pairs, then derived outputs
    pub fn available_pairs(&self) -> Vec<String> {
        let mut pairs = self.fetched_pairs();
        for rate in &self.derived {
            if !pairs.contains(&rate.output) {
                pairs.push(rate.output.clone());
            }
        }
        pairs
    }

    /// Check the configuration is usable before any fetch
    pub fn validate(&self) -> Result<()> {
        if self.tracked.currencies.is_empty() {
            return Err(RatesError::ConfigError(
                "No tracked currencies configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for code in &self.tracked.currencies {
            if !seen.insert(code) {
                return Err(RatesError::ConfigError(format!(
                    "Currency {} is tracked twice",
                    code
                )));
            }
        }

        if self.tracked.lookback_days == 0 || self.tracked.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(RatesError::ConfigError(format!(
                "lookback_days must be between 1 and {}, got {}",
                MAX_LOOKBACK_DAYS, self.tracked.lookback_days
            )));
        }

        if self.tracked.max_concurrent_fetches == 0 {
            return Err(RatesError::ConfigError(
                "max_concurrent_fetches must be at least 1".to_string(),
            ));
        }

        // Each derivation may use fetched pairs or outputs of earlier derivations
        let mut known: Vec<String> = self.fetched_pairs();
        for rate in &self.derived {
            for input in [&rate.numerator, &rate.denominator] {
                if !known.contains(input) {
                    return Err(RatesError::ConfigError(format!(
                        "Derived rate {} uses unknown column {}",
                        rate.output, input
                    )));
                }
            }
            known.push(rate.output.clone());
        }

        self.store.format().validate()?;
        for name in [&self.store.all_file_name, &self.store.selected_file_name] {
            validate_file_name(name).map_err(|e| {
                RatesError::ConfigError(format!("Invalid store file name: {}", e))
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RatesConfig::default();
        assert_eq!(config.tracked.base.code(), "PLN");
        assert_eq!(config.tracked.lookback_days, 30);
        assert_eq!(config.store.all_file_name, "all_currency_data.csv");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_available_pairs_order() {
        let config = RatesConfig::default();
        assert_eq!(
            config.available_pairs(),
            vec!["CHF/PLN", "USD/PLN", "EUR/PLN", "EUR/USD", "CHF/USD"]
        );
    }

    #[test]
    fn test_partial_toml() {
        let config = RatesConfig::from_toml_str(
            r#"
            [tracked]
            currencies = ["usd", "eur"]
            lookback_days = 10

            [store]
            separator = ";"
            decimal = ","

            [[derived]]
            numerator = "EUR/PLN"
            denominator = "USD/PLN"
            output = "EUR/USD"
            "#,
        )
        .unwrap();

        assert_eq!(config.tracked.currencies.len(), 2);
        assert_eq!(config.tracked.base.code(), "PLN");
        assert_eq!(config.tracked.max_concurrent_fetches, 3);
        assert_eq!(config.store.separator, ";");
        assert_eq!(config.derived.len(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = RatesConfig::default();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(RatesConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_currency_in_toml() {
        let result = RatesConfig::from_toml_str("[tracked]\ncurrencies = [\"dollar\"]\n");
        assert!(matches!(result, Err(RatesError::ConfigError(_))));
    }

    #[test]
    fn test_lookback_out_of_range() {
        let mut config = RatesConfig::default();
        config.tracked.lookback_days = MAX_LOOKBACK_DAYS + 1;
        assert!(config.validate().is_err());
        config.tracked.lookback_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_derivation_of_untracked_column() {
        let mut config = RatesConfig::default();
        config.derived.push(DerivedRate::new("GBP/PLN", "USD/PLN", "GBP/USD"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("GBP/PLN"));
    }

    #[test]
    fn test_duplicate_tracked_currency() {
        let mut config = RatesConfig::default();
        config.tracked.currencies.push(CurrencyCode::new("usd").unwrap());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let result = RatesConfig::load(Some(Path::new("/nonexistent/rusty-rates.toml")));
        assert!(matches!(result, Err(RatesError::ConfigError(_))));
    }

    #[test]
    fn test_store_file_name_must_be_plain() {
        let mut config = RatesConfig::default();
        config.store.all_file_name = "sub/all.csv".to_string();
        assert!(matches!(config.validate(), Err(RatesError::ConfigError(_))));

        let mut config = RatesConfig::default();
        config.store.selected_file_name = "..".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_digit_decimal_marker_rejected() {
        let mut config = RatesConfig::default();
        config.store.decimal = "0".to_string();
        assert!(config.validate().is_err());
    }
}
