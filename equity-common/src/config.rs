//! Configuration management for the equity analytics tools.
//!
//! All tools share one configuration file at `~/.equity-analytics/config.json`.
//!
//! # Configuration Priority
//!
//! 1. Environment variables (EQUITY_* prefix)
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `EQUITY_TICKERS` → tickers (comma separated, e.g. `AAPL,MSFT`)
//! - `EQUITY_DATA_DIR` → data.data_dir
//! - `EQUITY_AS_OF_DATE` → valuation.as_of_date (`YYYY-MM-DD`)
//! - `EQUITY_LOG_LEVEL` → observability.log_level
//! - `EQUITY_LOG_FORMAT` → observability.log_format

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result, ResultExt};

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".equity-analytics"),
        |dirs| dirs.home_dir().join(".equity-analytics"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Tickers analysed when nothing else is configured.
pub fn default_tickers() -> Vec<String> {
    ["AAPL", "BABA", "GOOGL", "TSLA", "NVDA"]
        .iter()
        .map(|t| (*t).to_string())
        .collect()
}

/// Split a comma separated ticker list, trimming blanks and upper-casing.
pub fn parse_ticker_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_uppercase)
        .collect()
}

// ============================================================================
// Data Configuration
// ============================================================================

/// Where market data snapshots live and which date range to read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Root data directory
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Snapshot document name, relative to `data_dir`
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: String,

    /// First date of the price history to load (inclusive)
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    /// Last date of the price history to load (inclusive)
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            snapshot_file: default_snapshot_file(),
            start_date: None,
            end_date: None,
        }
    }
}

impl DataConfig {
    /// Full path of the snapshot document.
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(&self.snapshot_file)
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_snapshot_file() -> String {
    "market_data.json".into()
}

// ============================================================================
// Valuation Configuration
// ============================================================================

/// DCF run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationSettings {
    /// Valuation date stamped on every result
    #[serde(default = "default_as_of_date")]
    pub as_of_date: NaiveDate,

    /// Next-5-year EPS growth estimates per ticker, used as the short-term rate
    #[serde(default = "default_eps_growth_5y")]
    pub eps_growth_5y: BTreeMap<String, f64>,

    /// Growth rate for years 11-20
    #[serde(default = "default_long_term_growth")]
    pub long_term_growth: f64,

    /// Medium-term rate as a fraction of the short-term rate
    #[serde(default = "default_medium_term_ratio")]
    pub medium_term_ratio: f64,

    /// Fixed discount rate; bypasses the beta lookup when set
    #[serde(default)]
    pub discount_rate_override: Option<f64>,
}

impl Default for ValuationSettings {
    fn default() -> Self {
        Self {
            as_of_date: default_as_of_date(),
            eps_growth_5y: default_eps_growth_5y(),
            long_term_growth: default_long_term_growth(),
            medium_term_ratio: default_medium_term_ratio(),
            discount_rate_override: None,
        }
    }
}

impl ValuationSettings {
    /// Short-term growth estimate for a ticker, if one is known. Keys match
    /// case-insensitively.
    pub fn short_term_growth(&self, ticker: &str) -> Option<f64> {
        self.eps_growth_5y
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(ticker.trim()))
            .map(|(_, growth)| *growth)
    }
}

fn default_as_of_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 10, 1).unwrap_or_default()
}

fn default_eps_growth_5y() -> BTreeMap<String, f64> {
    [
        ("AAPL", 0.074),
        ("BABA", 0.1058),
        ("GOOGL", 0.2015),
        ("TSLA", 0.0855),
        ("NVDA", 0.7870),
    ]
    .iter()
    .map(|(t, g)| ((*t).to_string(), *g))
    .collect()
}

fn default_long_term_growth() -> f64 {
    0.04
}

fn default_medium_term_ratio() -> f64 {
    0.5
}

// ============================================================================
// Indicator Configuration
// ============================================================================

/// Technical indicator parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSettings {
    /// SMA window lengths
    #[serde(default = "default_sma_periods")]
    pub sma_periods: Vec<usize>,

    /// Price field the SMAs read (Open, High, Low, Close, Volume)
    #[serde(default = "default_sma_price_field")]
    pub sma_price_field: String,

    /// EMA spans
    #[serde(default = "default_ema_spans")]
    pub ema_spans: Vec<usize>,

    /// RSI smoothing span
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    /// Compute the cumulative VWAP
    #[serde(default = "default_true")]
    pub vwap: bool,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            sma_periods: default_sma_periods(),
            sma_price_field: default_sma_price_field(),
            ema_spans: default_ema_spans(),
            rsi_period: default_rsi_period(),
            vwap: true,
        }
    }
}

fn default_sma_periods() -> Vec<usize> {
    vec![9, 20, 50, 100, 200]
}

fn default_sma_price_field() -> String {
    "Close".into()
}

fn default_ema_spans() -> Vec<usize> {
    vec![9, 20, 50]
}

fn default_rsi_period() -> usize {
    14
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,

    /// Additional module targets forced to `warn`.
    #[serde(default)]
    pub excluded_targets: Vec<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            excluded_targets: Vec::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// JSON Schema reference
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Tickers to analyse, in order
    #[serde(default = "default_tickers")]
    pub tickers: Vec<String>,

    /// Market data location
    #[serde(default)]
    pub data: DataConfig,

    /// DCF settings
    #[serde(default)]
    pub valuation: ValuationSettings,

    /// Indicator parameters
    #[serde(default)]
    pub indicators: IndicatorSettings,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema: None,
            tickers: default_tickers(),
            data: DataConfig::default(),
            valuation: ValuationSettings::default(),
            indicators: IndicatorSettings::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .context(format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration with environment variable overrides.
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("EQUITY_TICKERS") {
            let tickers = parse_ticker_list(&raw);
            if !tickers.is_empty() {
                self.tickers = tickers;
            }
        }

        if let Some(dir) = lookup("EQUITY_DATA_DIR") {
            self.data.data_dir = PathBuf::from(dir);
        }

        if let Some(raw) = lookup("EQUITY_AS_OF_DATE") {
            self.valuation.as_of_date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|e| Error::Config(format!("EQUITY_AS_OF_DATE '{raw}': {e}")))?;
        }

        if let Some(level) = lookup("EQUITY_LOG_LEVEL") {
            self.observability.log_level = level;
        }

        if let Some(format) = lookup("EQUITY_LOG_FORMAT") {
            self.observability.log_format = format;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.tickers, vec!["AAPL", "BABA", "GOOGL", "TSLA", "NVDA"]);
        assert_eq!(config.data.snapshot_path(), PathBuf::from("./data/market_data.json"));
        assert_eq!(config.valuation.as_of_date, NaiveDate::from_ymd_opt(2023, 10, 1).unwrap());
        assert_eq!(config.indicators.rsi_period, 14);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_short_term_growth_lookup() {
        let settings = ValuationSettings::default();
        assert_eq!(settings.short_term_growth("aapl"), Some(0.074));
        assert_eq!(settings.short_term_growth("NVDA"), Some(0.7870));
        assert_eq!(settings.short_term_growth("MSFT"), None);
    }

    #[test]
    fn test_growth_keys_from_json_match_any_case() {
        let config: Config = serde_json::from_str(
            r#"{ "tickers": ["msft"], "valuation": { "eps_growth_5y": { "msft": 0.1, "Tsla": 0.2 } } }"#,
        )
        .unwrap();
        assert_eq!(config.valuation.short_term_growth("MSFT"), Some(0.1));
        assert_eq!(config.valuation.short_term_growth("msft"), Some(0.1));
        assert_eq!(config.valuation.short_term_growth("TSLA"), Some(0.2));
        assert_eq!(config.valuation.short_term_growth("AAPL"), None);
    }

    #[test]
    fn test_parse_ticker_list() {
        assert_eq!(parse_ticker_list("aapl, msft,,TSLA "), vec!["AAPL", "MSFT", "TSLA"]);
        assert!(parse_ticker_list(" , ").is_empty());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(
            r#"{ "tickers": ["MSFT"], "indicators": { "rsi_period": 21 } }"#,
        )
        .unwrap();
        assert_eq!(config.tickers, vec!["MSFT"]);
        assert_eq!(config.indicators.rsi_period, 21);
        assert_eq!(config.indicators.sma_periods, vec![9, 20, 50, 100, 200]);
        assert!((config.valuation.long_term_growth - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_observability_aliases() {
        let config: Config =
            serde_json::from_str(r#"{ "observability": { "level": "debug", "format": "json" } }"#)
                .unwrap();
        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.observability.log_format, "json");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"{{ "data": {{ "data_dir": "/srv/market", "start_date": "2020-01-01" }} }}"#
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.data.data_dir, PathBuf::from("/srv/market"));
        assert_eq!(config.data.start_date, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(config.tickers.len(), 5);
    }

    #[test]
    fn test_load_from_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup_from(&[
                ("EQUITY_TICKERS", "msft,amzn"),
                ("EQUITY_DATA_DIR", "/tmp/equity"),
                ("EQUITY_AS_OF_DATE", "2024-03-31"),
                ("EQUITY_LOG_LEVEL", "debug"),
            ]))
            .unwrap();

        assert_eq!(config.tickers, vec!["MSFT", "AMZN"]);
        assert_eq!(config.data.data_dir, PathBuf::from("/tmp/equity"));
        assert_eq!(config.valuation.as_of_date, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.observability.log_format, "pretty");
    }

    #[test]
    fn test_blank_ticker_override_keeps_defaults() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup_from(&[("EQUITY_TICKERS", " , ")]))
            .unwrap();
        assert_eq!(config.tickers, default_tickers());
    }

    #[test]
    fn test_invalid_as_of_override() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(lookup_from(&[("EQUITY_AS_OF_DATE", "01/10/2023")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
