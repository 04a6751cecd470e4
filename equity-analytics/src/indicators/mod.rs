//! Technical Indicators.
//!
//! Four independent transforms over a [`PriceSeries`](crate::data::PriceSeries):
//!
//! - **SMA**: trailing arithmetic mean of any price field
//! - **EMA**: exponential smoothing of close, seeded with the first close
//! - **RSI**: smoothed gain/loss ratio mapped to `[0, 100]`
//! - **VWAP**: cumulative volume-weighted average close
//!
//! Every calculator borrows one series at construction, computes on `run()`
//! and hands out results through `get_series()`. Calling `get_series()` before
//! `run()` is [`IndicatorError::NotRun`].
//!
//! Outputs are aligned with the input dates. Entries that are not yet defined
//! (SMA before the window fills, VWAP before any volume) are `None`.

pub mod ema;
pub mod rsi;
pub mod sma;
pub mod vwap;

pub use ema::ExponentialMovingAverages;
pub use rsi::{Rsi, DEFAULT_RSI_PERIOD};
pub use sma::SimpleMovingAverages;
pub use vwap::Vwap;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::data::SeriesError;

// ============================================================================
// Errors
// ============================================================================

/// Indicator errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    /// Window or span of zero
    #[error("{indicator} period must be at least 1, got {period}")]
    InvalidPeriod {
        indicator: &'static str,
        period: usize,
    },

    /// Results requested before `run()`
    #[error("{0} has not been run")]
    NotRun(&'static str),

    /// Results requested for a period the calculator was not built with
    #[error("{indicator} was not configured for period {period}")]
    UnknownPeriod {
        indicator: &'static str,
        period: usize,
    },

    /// Input failed series validation
    #[error(transparent)]
    Series(#[from] SeriesError),
}

pub(crate) fn check_period(indicator: &'static str, period: usize) -> Result<(), IndicatorError> {
    if period == 0 {
        Err(IndicatorError::InvalidPeriod { indicator, period })
    } else {
        Ok(())
    }
}

// ============================================================================
// Indicator Series
// ============================================================================

/// Indicator output aligned with the input dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSeries {
    name: String,
    dates: Vec<NaiveDate>,
    values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    pub(crate) fn new(name: impl Into<String>, dates: Vec<NaiveDate>, values: Vec<Option<f64>>) -> Self {
        debug_assert_eq!(dates.len(), values.len());
        Self {
            name: name.into(),
            dates,
            values,
        }
    }

    /// Label such as `SMA_20` or `RSI_14`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// One entry per input date.
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at a position; `None` when out of range or undefined.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    /// Value on a date; `None` when the date is absent or undefined.
    pub fn value_on(&self, date: NaiveDate) -> Option<f64> {
        self.dates
            .binary_search(&date)
            .ok()
            .and_then(|i| self.get(i))
    }

    /// Defined entries only.
    pub fn defined(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates
            .iter()
            .zip(&self.values)
            .filter_map(|(d, v)| v.map(|v| (*d, v)))
    }

    /// Last defined value.
    pub fn latest(&self) -> Option<f64> {
        self.values.iter().rev().find_map(|v| *v)
    }
}

/// Exponentially weighted mean with `alpha = 2 / (span + 1)`, seeded with the
/// first value and without bias adjustment.
pub(crate) fn ewm(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;

    for &x in values {
        let next = match prev {
            None => x,
            Some(p) => p + alpha * (x - p),
        };
        out.push(next);
        prev = Some(next);
    }

    out
}
