//! Cumulative volume-weighted average price.

use super::{IndicatorError, IndicatorSeries};
use crate::data::PriceSeries;

const NAME: &str = "VWAP";

/// Running `sum(close * volume) / sum(volume)` from the first bar.
///
/// Undefined while no volume has traded.
#[derive(Debug, Clone)]
pub struct Vwap<'a> {
    series: &'a PriceSeries,
    result: Option<IndicatorSeries>,
}

impl<'a> Vwap<'a> {
    pub fn new(series: &'a PriceSeries) -> Self {
        Self {
            series,
            result: None,
        }
    }

    pub fn run(&mut self) {
        let mut traded_value = 0.0;
        let mut volume = 0.0;

        let values = self
            .series
            .bars()
            .iter()
            .map(|bar| {
                traded_value += bar.traded_value();
                volume += bar.volume;
                (volume > 0.0).then(|| traded_value / volume)
            })
            .collect();

        self.result = Some(IndicatorSeries::new(NAME, self.series.dates(), values));
    }

    pub fn get_series(&self) -> Result<&IndicatorSeries, IndicatorError> {
        self.result.as_ref().ok_or(IndicatorError::NotRun(NAME))
    }
}
