//! Batch report types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Results for one ticker.
///
/// Every figure is optional: a ticker with no fundamentals still reports its
/// indicators, and one with no prices can still carry a fair value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerReport {
    pub symbol: String,
    /// Bars loaded for the indicators
    pub price_bars: usize,
    /// Date of the last bar
    pub last_date: Option<NaiveDate>,
    pub last_close: Option<f64>,

    /// DCF fair value per share
    pub fair_value: Option<f64>,
    /// Discount rate behind `fair_value`
    pub discount_rate: Option<f64>,
    /// Why `fair_value` is absent
    pub valuation_unavailable: Option<String>,
    /// Fair value vs last close, in percent
    pub upside_pct: Option<f64>,

    /// Latest SMA per period
    pub sma: BTreeMap<usize, Option<f64>>,
    /// Latest EMA per span
    pub ema: BTreeMap<usize, Option<f64>>,
    pub rsi: Option<f64>,
    pub vwap: Option<f64>,

    /// Non-valuation failures (missing prices, bad rows, ...)
    pub errors: Vec<String>,
}

impl TickerReport {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    pub fn is_valued(&self) -> bool {
        self.fair_value.is_some()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Output of one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Correlates the report with the run's log lines
    pub run_id: String,
    /// Valuation date
    pub as_of: NaiveDate,
    /// Provider the data came from
    pub provider: String,
    /// One entry per configured ticker, in configured order
    pub tickers: Vec<TickerReport>,
}

impl AnalysisReport {
    /// Look up a ticker (case-insensitive).
    pub fn get(&self, symbol: &str) -> Option<&TickerReport> {
        self.tickers
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Tickers that received a fair value.
    pub fn valued_count(&self) -> usize {
        self.tickers.iter().filter(|t| t.is_valued()).count()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> AnalysisReport {
        let mut valued = TickerReport::new("AAPL");
        valued.fair_value = Some(84.88);
        valued.sma.insert(9, Some(171.2));
        valued.sma.insert(200, None);

        let mut failed = TickerReport::new("NOPE");
        failed.errors.push("no price data".into());

        AnalysisReport {
            run_id: "run-1".into(),
            as_of: NaiveDate::from_ymd_opt(2023, 10, 1).unwrap(),
            provider: "memory".into(),
            tickers: vec![valued, failed],
        }
    }

    #[test]
    fn test_lookup_and_counts() {
        let report = report();
        assert_eq!(report.valued_count(), 1);
        assert!(report.get("aapl").unwrap().is_valued());
        assert!(report.get("NOPE").unwrap().has_errors());
        assert!(report.get("MSFT").is_none());
    }

    #[test]
    fn test_json_shape() {
        let json: serde_json::Value =
            serde_json::from_str(&report().to_json_pretty().unwrap()).unwrap();
        assert_eq!(json["as_of"], "2023-10-01");
        assert_eq!(json["tickers"][0]["sma"]["9"], 171.2);
        assert!(json["tickers"][0]["sma"]["200"].is_null());
        assert!(json["tickers"][1]["fair_value"].is_null());
    }
}
