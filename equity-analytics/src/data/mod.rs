//! Market data model.
//!
//! Typed inputs for the calculation core:
//! - **PriceSeries**: validated, date-ordered OHLCV bars for one ticker
//! - **FundamentalsSnapshot**: the scalar inputs to the DCF model
//!
//! Providers (see [`provider`]) hand these to callers; the core never reads
//! files itself.

pub mod provider;
pub mod snapshot;

pub use provider::{InMemoryProvider, MarketDataProvider, ProviderError};
pub use snapshot::{RawPriceRow, SnapshotDocument, SnapshotProvider};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Series Errors
// ============================================================================

/// Validation errors raised at the series boundary, before any computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    /// A required column is absent from an input row
    #[error("Missing column '{column}' in row {row}")]
    MissingColumn { column: &'static str, row: usize },

    /// A date cell that is not `YYYY-MM-DD` (optionally followed by a time)
    #[error("Invalid date '{value}' in row {row}")]
    InvalidDate { value: String, row: usize },

    /// A price field name that the series does not carry
    #[error("'{0}' is not a valid price field (expected Open, High, Low, Close or Volume)")]
    UnknownField(String),

    /// Dates must be strictly increasing
    #[error("Dates out of order: {current} follows {previous}")]
    UnsortedDates {
        previous: NaiveDate,
        current: NaiveDate,
    },

    /// The same date appears twice
    #[error("Duplicate date {0}")]
    DuplicateDate(NaiveDate),

    /// NaN or infinite value
    #[error("Non-finite {field} on {date}")]
    NonFinite { date: NaiveDate, field: PriceField },

    /// Volume below zero
    #[error("Negative volume on {0}")]
    NegativeVolume(NaiveDate),
}

// ============================================================================
// Price Fields
// ============================================================================

/// Numeric column of an OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl PriceField {
    /// All fields, in column order.
    pub const ALL: [PriceField; 5] = [
        PriceField::Open,
        PriceField::High,
        PriceField::Low,
        PriceField::Close,
        PriceField::Volume,
    ];

    /// Vendor-style column name (e.g. "Close").
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::High => "High",
            Self::Low => "Low",
            Self::Close => "Close",
            Self::Volume => "Volume",
        }
    }
}

impl FromStr for PriceField {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "high" => Ok(Self::High),
            "low" => Ok(Self::Low),
            "close" => Ok(Self::Close),
            "volume" => Ok(Self::Volume),
            _ => Err(SeriesError::UnknownField(s.to_string())),
        }
    }
}

impl std::fmt::Display for PriceField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column_name())
    }
}

// ============================================================================
// Price Bars
// ============================================================================

/// One daily OHLCV record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Trading date
    pub date: NaiveDate,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Volume
    pub volume: f64,
}

impl PriceBar {
    /// Create a new bar.
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Read one field.
    pub fn field(&self, field: PriceField) -> f64 {
        match field {
            PriceField::Open => self.open,
            PriceField::High => self.high,
            PriceField::Low => self.low,
            PriceField::Close => self.close,
            PriceField::Volume => self.volume,
        }
    }

    /// Close times volume.
    pub fn traded_value(&self) -> f64 {
        self.close * self.volume
    }

    fn check(&self) -> Result<(), SeriesError> {
        for field in PriceField::ALL {
            if !self.field(field).is_finite() {
                return Err(SeriesError::NonFinite {
                    date: self.date,
                    field,
                });
            }
        }
        if self.volume < 0.0 {
            return Err(SeriesError::NegativeVolume(self.date));
        }
        Ok(())
    }
}

// ============================================================================
// Price Series
// ============================================================================

/// Date-ordered OHLCV bars for one ticker.
///
/// Dates are strictly increasing and every value is finite; both are checked
/// once when the series is built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series from bars that are already in date order.
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, SeriesError> {
        for bar in &bars {
            bar.check()?;
        }

        for pair in bars.windows(2) {
            let (previous, current) = (pair[0].date, pair[1].date);
            if current == previous {
                return Err(SeriesError::DuplicateDate(current));
            }
            if current < previous {
                return Err(SeriesError::UnsortedDates { previous, current });
            }
        }

        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    /// Build a series from bars in any order. Duplicates are still rejected.
    pub fn from_unsorted(
        symbol: impl Into<String>,
        mut bars: Vec<PriceBar>,
    ) -> Result<Self, SeriesError> {
        bars.sort_by_key(|b| b.date);
        Self::new(symbol, bars)
    }

    /// A series with no bars.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
        }
    }

    /// Ticker symbol
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// All bars in date order
    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Dates in order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    /// One column as a vector, aligned with [`dates`](Self::dates).
    pub fn values(&self, field: PriceField) -> Vec<f64> {
        self.bars.iter().map(|b| b.field(field)).collect()
    }

    /// Close prices.
    pub fn closes(&self) -> Vec<f64> {
        self.values(PriceField::Close)
    }

    pub fn first(&self) -> Option<&PriceBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Bars within `[start, end]`; an open bound is unbounded.
    pub fn between(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        let bars = self
            .bars
            .iter()
            .filter(|b| start.map_or(true, |s| b.date >= s))
            .filter(|b| end.map_or(true, |e| b.date <= e))
            .copied()
            .collect();

        Self {
            symbol: self.symbol.clone(),
            bars,
        }
    }
}

// ============================================================================
// Fundamentals
// ============================================================================

/// Scalar fundamentals for one entity as of one date.
///
/// Every figure is optional: `None` means the provider had no value, which is
/// not the same as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundamentalsSnapshot {
    /// Ticker symbol
    #[serde(default)]
    pub symbol: String,
    /// Date the figures refer to
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
    /// Free cash flow (latest fiscal year)
    #[serde(default)]
    pub free_cash_flow: Option<f64>,
    /// Cash, cash equivalents and short-term investments
    #[serde(default)]
    pub cash_and_equivalents: Option<f64>,
    /// Total debt
    #[serde(default)]
    pub total_debt: Option<f64>,
    /// Shares outstanding
    #[serde(default)]
    pub shares_outstanding: Option<f64>,
    /// Equity beta
    #[serde(default)]
    pub beta: Option<f64>,
}

impl FundamentalsSnapshot {
    /// Snapshot with every figure present.
    pub fn complete(
        symbol: impl Into<String>,
        free_cash_flow: f64,
        cash_and_equivalents: f64,
        total_debt: f64,
        shares_outstanding: f64,
        beta: f64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            as_of: None,
            free_cash_flow: Some(free_cash_flow),
            cash_and_equivalents: Some(cash_and_equivalents),
            total_debt: Some(total_debt),
            shares_outstanding: Some(shares_outstanding),
            beta: Some(beta),
        }
    }

    /// Names of the figures the provider did not supply.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("free_cash_flow", self.free_cash_flow),
            ("cash_and_equivalents", self.cash_and_equivalents),
            ("total_debt", self.total_debt),
            ("shares_outstanding", self.shares_outstanding),
            ("beta", self.beta),
        ]
        .iter()
        .filter(|(_, v)| v.is_none())
        .map(|(name, _)| *name)
        .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
