//! Data provider abstraction.
//!
//! Defines the `MarketDataProvider` trait that every source of price history
//! and fundamentals implements. "No data" is `Ok(None)`, distinct from a
//! failure.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;

use super::{FundamentalsSnapshot, PriceSeries, SeriesError};

// ============================================================================
// Provider Error
// ============================================================================

/// Errors specific to data providers.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// The backing source does not exist
    NotFound(String),
    /// The backing source could not be read
    Io(String),
    /// The backing source could not be decoded
    Parse(String),
    /// Data was present but failed boundary validation
    InvalidData { symbol: String, source: SeriesError },
    /// Provider is unavailable
    Unavailable(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::Io(msg) => write!(f, "IO error: {}", msg),
            Self::Parse(msg) => write!(f, "Parse error: {}", msg),
            Self::InvalidData { symbol, source } => {
                write!(f, "Invalid data for {}: {}", symbol, source)
            }
            Self::Unavailable(msg) => write!(f, "Provider unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidData { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ============================================================================
// Provider Trait
// ============================================================================

/// Source of daily prices and fundamentals.
pub trait MarketDataProvider {
    /// Provider name for logs (e.g. "snapshot", "memory")
    fn name(&self) -> &'static str;

    /// Daily OHLCV history for a symbol within `[start, end]`.
    ///
    /// Returns `Ok(None)` when the provider knows nothing about the symbol.
    fn daily_prices(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Option<PriceSeries>, ProviderError>;

    /// Fundamentals snapshot for a symbol as of a date.
    ///
    /// Returns `Ok(None)` when the provider knows nothing about the symbol.
    fn fundamentals(
        &self,
        symbol: &str,
        as_of: NaiveDate,
    ) -> Result<Option<FundamentalsSnapshot>, ProviderError>;
}

// ============================================================================
// In-Memory Provider
// ============================================================================

/// Hash-map backed provider for embedding callers and tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProvider {
    prices: HashMap<String, PriceSeries>,
    fundamentals: HashMap<String, FundamentalsSnapshot>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a price series under its own symbol.
    pub fn with_prices(mut self, series: PriceSeries) -> Self {
        self.prices.insert(series.symbol().to_uppercase(), series);
        self
    }

    /// Register a fundamentals snapshot under its own symbol.
    pub fn with_fundamentals(mut self, snapshot: FundamentalsSnapshot) -> Self {
        self.fundamentals
            .insert(snapshot.symbol.to_uppercase(), snapshot);
        self
    }
}

impl MarketDataProvider for InMemoryProvider {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn daily_prices(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Option<PriceSeries>, ProviderError> {
        Ok(self
            .prices
            .get(&symbol.to_uppercase())
            .map(|s| s.between(start, end)))
    }

    fn fundamentals(
        &self,
        symbol: &str,
        _as_of: NaiveDate,
    ) -> Result<Option<FundamentalsSnapshot>, ProviderError> {
        Ok(self.fundamentals.get(&symbol.to_uppercase()).cloned())
    }
}

// ============================================================================
// Tests
// ============================================================================
