//! JSON snapshot provider.
//!
//! Reads one document written by whatever acquisition tooling is in use:
//!
//! ```json
//! {
//!   "prices": {
//!     "AAPL": [
//!       { "Date": "2023-01-03", "Open": 130.28, "High": 130.9,
//!         "Low": 124.17, "Close": 125.07, "Volume": 112117500 }
//!     ]
//!   },
//!   "fundamentals": {
//!     "AAPL": { "free_cash_flow": 99584000000, "beta": 1.29 }
//!   }
//! }
//! ```
//!
//! Price rows keep the vendor's capitalised column names. Extra columns
//! (`Dividends`, `Stock Splits`, ...) are ignored; a missing required column
//! fails the whole series for that ticker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::provider::{MarketDataProvider, ProviderError};
use super::{FundamentalsSnapshot, PriceBar, PriceSeries, SeriesError};

// ============================================================================
// Document Types
// ============================================================================

/// One vendor-style OHLCV row. Every column is optional until validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPriceRow {
    #[serde(rename = "Date", default)]
    pub date: Option<String>,
    #[serde(rename = "Open", default)]
    pub open: Option<f64>,
    #[serde(rename = "High", default)]
    pub high: Option<f64>,
    #[serde(rename = "Low", default)]
    pub low: Option<f64>,
    #[serde(rename = "Close", default)]
    pub close: Option<f64>,
    #[serde(rename = "Volume", default)]
    pub volume: Option<f64>,
}

impl RawPriceRow {
    /// Parsed `Date` cell. `row` is used in errors only.
    pub fn parse_date(&self, row: usize) -> Result<NaiveDate, SeriesError> {
        let raw_date = self.date.as_deref().ok_or(SeriesError::MissingColumn {
            column: "Date",
            row,
        })?;
        parse_row_date(raw_date).ok_or_else(|| SeriesError::InvalidDate {
            value: raw_date.to_string(),
            row,
        })
    }

    /// Validate the row and turn it into a bar. `row` is used in errors only.
    pub fn to_bar(&self, row: usize) -> Result<PriceBar, SeriesError> {
        let date = self.parse_date(row)?;

        let column = |value: Option<f64>, column: &'static str| {
            value.ok_or(SeriesError::MissingColumn { column, row })
        };

        Ok(PriceBar::new(
            date,
            column(self.open, "Open")?,
            column(self.high, "High")?,
            column(self.low, "Low")?,
            column(self.close, "Close")?,
            column(self.volume, "Volume")?,
        ))
    }
}

/// Vendor dates come as `2023-01-03` or `2023-01-03 00:00:00-05:00`.
fn parse_row_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Validate rows into a series for `symbol`. Row order does not matter.
///
/// Only rows dated within `[start, end]` are checked; anything outside the
/// window is dropped unchecked. Every row still needs a readable date.
pub fn rows_to_series_between(
    symbol: &str,
    rows: &[RawPriceRow],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<PriceSeries, SeriesError> {
    let mut bars = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let date = row.parse_date(i)?;
        if start.map_or(false, |s| date < s) || end.map_or(false, |e| date > e) {
            continue;
        }
        bars.push(row.to_bar(i)?);
    }
    PriceSeries::from_unsorted(symbol, bars)
}

/// Whole snapshot document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    /// Price rows per ticker
    #[serde(default)]
    pub prices: BTreeMap<String, Vec<RawPriceRow>>,
    /// Fundamentals per ticker
    #[serde(default)]
    pub fundamentals: BTreeMap<String, FundamentalsSnapshot>,
}

impl SnapshotDocument {
    fn price_rows(&self, symbol: &str) -> Option<&Vec<RawPriceRow>> {
        self.prices
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(symbol))
            .map(|(_, v)| v)
    }

    fn fundamentals_for(&self, symbol: &str) -> Option<&FundamentalsSnapshot> {
        self.fundamentals
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(symbol))
            .map(|(_, v)| v)
    }
}

// ============================================================================
// Snapshot Provider
// ============================================================================

/// Provider backed by a [`SnapshotDocument`] held in memory.
#[derive(Debug, Clone)]
pub struct SnapshotProvider {
    document: SnapshotDocument,
    source: Option<PathBuf>,
}

impl SnapshotProvider {
    /// Read and parse a snapshot file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ProviderError::NotFound(path.display().to_string())
            } else {
                ProviderError::Io(format!("{}: {}", path.display(), e))
            }
        })?;
        let document: SnapshotDocument = serde_json::from_str(&content)
            .map_err(|e| ProviderError::Parse(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(
            path = %path.display(),
            price_tickers = document.prices.len(),
            fundamental_tickers = document.fundamentals.len(),
            "Loaded market data snapshot"
        );

        Ok(Self {
            document,
            source: Some(path.to_path_buf()),
        })
    }

    /// Like [`open`](Self::open), but a missing file yields an empty
    /// document, so every ticker reports "no data" instead of the run failing.
    pub fn open_or_empty(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let path = path.as_ref();
        match Self::open(path) {
            Err(ProviderError::NotFound(_)) => {
                tracing::warn!(
                    path = %path.display(),
                    "Market data snapshot not found, continuing without data"
                );
                Ok(Self {
                    document: SnapshotDocument::default(),
                    source: None,
                })
            }
            other => other,
        }
    }

    /// Wrap an already parsed document.
    pub fn from_document(document: SnapshotDocument) -> Self {
        Self {
            document,
            source: None,
        }
    }

    /// File the snapshot was read from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn document(&self) -> &SnapshotDocument {
        &self.document
    }
}

impl MarketDataProvider for SnapshotProvider {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    fn daily_prices(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Option<PriceSeries>, ProviderError> {
        let Some(rows) = self.document.price_rows(symbol) else {
            return Ok(None);
        };

        let series = rows_to_series_between(&symbol.to_uppercase(), rows, start, end).map_err(
            |source| ProviderError::InvalidData {
                symbol: symbol.to_uppercase(),
                source,
            },
        )?;

        Ok(Some(series))
    }

    fn fundamentals(
        &self,
        symbol: &str,
        as_of: NaiveDate,
    ) -> Result<Option<FundamentalsSnapshot>, ProviderError> {
        let Some(snapshot) = self.document.fundamentals_for(symbol) else {
            return Ok(None);
        };

        // Figures dated after the valuation date are not usable as of that date.
        if let Some(date) = snapshot.as_of {
            if date > as_of {
                tracing::debug!(
                    symbol = %symbol,
                    snapshot_date = %date,
                    as_of = %as_of,
                    "Fundamentals postdate valuation date"
                );
                return Ok(None);
            }
        }

        let mut snapshot = snapshot.clone();
        if snapshot.symbol.is_empty() {
            snapshot.symbol = symbol.to_uppercase();
        }
        Ok(Some(snapshot))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DOC: &str = r#"{
        "prices": {
            "aapl": [
                { "Date": "2023-01-04 00:00:00-05:00", "Open": 126.9, "High": 128.7,
                  "Low": 125.1, "Close": 126.4, "Volume": 89113600, "Dividends": 0.0 },
                { "Date": "2023-01-03", "Open": 130.3, "High": 130.9,
                  "Low": 124.2, "Close": 125.1, "Volume": 112117500 }
            ],
            "BROKEN": [
                { "Date": "2023-01-03", "Open": 1.0, "High": 1.0, "Low": 1.0, "Volume": 5 }
            ]
        },
        "fundamentals": {
            "AAPL": { "free_cash_flow": 1.0, "cash_and_equivalents": 2.0,
                      "total_debt": 3.0, "shares_outstanding": 4.0, "beta": 1.3 },
            "LATE": { "as_of": "2024-06-30", "free_cash_flow": 1.0 }
        }
    }"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn provider() -> SnapshotProvider {
        SnapshotProvider::from_document(serde_json::from_str(DOC).unwrap())
    }

    #[test]
    fn test_rows_sorted_and_extra_columns_ignored() {
        let series = provider()
            .daily_prices("AAPL", None, None)
            .unwrap()
            .unwrap();
        assert_eq!(series.symbol(), "AAPL");
        assert_eq!(series.dates(), vec![date(2023, 1, 3), date(2023, 1, 4)]);
        assert!((series.closes()[0] - 125.1).abs() < 1e-9);
    }

    #[test]
    fn test_missing_column_is_invalid_data() {
        let err = provider().daily_prices("BROKEN", None, None).unwrap_err();
        assert_eq!(
            err,
            ProviderError::InvalidData {
                symbol: "BROKEN".into(),
                source: SeriesError::MissingColumn {
                    column: "Close",
                    row: 0
                },
            }
        );
    }

    #[test]
    fn test_bad_row_outside_window_is_ignored() {
        let doc: SnapshotDocument = serde_json::from_str(
            r#"{ "prices": { "MSFT": [
                { "Date": "2019-12-31", "Open": 1.0, "High": 1.0, "Low": 1.0, "Volume": 5 },
                { "Date": "2020-01-02", "Open": 2.0, "High": 2.0, "Low": 2.0, "Close": 2.0, "Volume": 5 },
                { "Date": "2020-01-03", "Open": 3.0, "High": 3.0, "Low": 3.0, "Close": 3.0, "Volume": 5 }
            ] } }"#,
        )
        .unwrap();
        let provider = SnapshotProvider::from_document(doc);

        let series = provider
            .daily_prices("MSFT", Some(date(2020, 1, 1)), None)
            .unwrap()
            .unwrap();
        assert_eq!(series.dates(), vec![date(2020, 1, 2), date(2020, 1, 3)]);

        // no lower bound, so the broken row is inside the window
        assert!(matches!(
            provider.daily_prices("MSFT", None, Some(date(2020, 1, 2))),
            Err(ProviderError::InvalidData { .. })
        ));
    }

    #[test]
    fn test_bad_date() {
        let row = RawPriceRow {
            date: Some("03/01/2023".into()),
            ..Default::default()
        };
        assert!(matches!(
            row.to_bar(7),
            Err(SeriesError::InvalidDate { row: 7, .. })
        ));
    }

    #[test]
    fn test_fundamentals_symbol_filled_from_key() {
        let snap = provider()
            .fundamentals("aapl", date(2023, 10, 1))
            .unwrap()
            .unwrap();
        assert_eq!(snap.symbol, "AAPL");
        assert_eq!(snap.beta, Some(1.3));
    }

    #[test]
    fn test_future_fundamentals_are_no_data() {
        let provider = provider();
        assert!(provider
            .fundamentals("LATE", date(2023, 10, 1))
            .unwrap()
            .is_none());
        assert!(provider
            .fundamentals("LATE", date(2024, 12, 31))
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_unknown_symbol() {
        let provider = provider();
        assert!(provider.daily_prices("TSLA", None, None).unwrap().is_none());
        assert!(provider
            .fundamentals("TSLA", date(2023, 10, 1))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_open_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("market_data.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(DOC.as_bytes()).unwrap();

        let provider = SnapshotProvider::open(&path).unwrap();
        assert_eq!(provider.source(), Some(path.as_path()));
        assert_eq!(provider.document().prices.len(), 2);
    }

    #[test]
    fn test_open_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = SnapshotProvider::open(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(missing, ProviderError::NotFound(_)));

        let path = dir.path().join("bad.json");
        fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(
            SnapshotProvider::open(&path).unwrap_err(),
            ProviderError::Parse(_)
        ));
        assert!(matches!(
            SnapshotProvider::open_or_empty(&path).unwrap_err(),
            ProviderError::Parse(_)
        ));
    }

    #[test]
    fn test_missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let provider = SnapshotProvider::open_or_empty(dir.path().join("absent.json")).unwrap();
        assert!(provider.source().is_none());
        assert!(provider.daily_prices("AAPL", None, None).unwrap().is_none());
        assert!(provider
            .fundamentals("AAPL", date(2023, 10, 1))
            .unwrap()
            .is_none());
    }
}
