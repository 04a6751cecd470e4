//! Relative strength index.

use super::{check_period, ewm, IndicatorError, IndicatorSeries};
use crate::data::PriceSeries;

const NAME: &str = "RSI";

/// Smoothing span used when none is given.
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// RSI of close, smoothing gains and losses with the same EMA recursion as
/// [`ExponentialMovingAverages`](super::ExponentialMovingAverages).
///
/// The first entry has no price change and is undefined. Afterwards an
/// average loss of zero gives 100, an average gain of zero gives 0, and both
/// zero (a flat stretch from the start) stays undefined.
#[derive(Debug, Clone)]
pub struct Rsi<'a> {
    series: &'a PriceSeries,
    period: usize,
    result: Option<IndicatorSeries>,
}

impl<'a> Rsi<'a> {
    pub fn new(series: &'a PriceSeries, period: usize) -> Result<Self, IndicatorError> {
        check_period(NAME, period)?;
        Ok(Self {
            series,
            period,
            result: None,
        })
    }

    /// RSI with the conventional 14-day span.
    pub fn with_default_period(series: &'a PriceSeries) -> Self {
        Self {
            series,
            period: DEFAULT_RSI_PERIOD,
            result: None,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn run(&mut self) {
        let closes = self.series.closes();

        let mut gains = Vec::with_capacity(closes.len());
        let mut losses = Vec::with_capacity(closes.len());
        if !closes.is_empty() {
            gains.push(0.0);
            losses.push(0.0);
        }
        for pair in closes.windows(2) {
            let change = pair[1] - pair[0];
            gains.push(change.max(0.0));
            losses.push((-change).max(0.0));
        }

        let avg_gain = ewm(&gains, self.period);
        let avg_loss = ewm(&losses, self.period);

        let values = avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(&gain, &loss)| rsi_value(gain, loss))
            .collect();

        let name = format!("{NAME}_{}", self.period);
        self.result = Some(IndicatorSeries::new(name, self.series.dates(), values));
    }

    pub fn get_series(&self) -> Result<&IndicatorSeries, IndicatorError> {
        self.result.as_ref().ok_or(IndicatorError::NotRun(NAME))
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    match (avg_gain > 0.0, avg_loss > 0.0) {
        (false, false) => None,
        (true, false) => Some(100.0),
        (false, true) => Some(0.0),
        (true, true) => {
            let rs = avg_gain / avg_loss;
            Some((100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0))
        }
    }
}
