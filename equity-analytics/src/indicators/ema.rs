//! Exponential moving averages of close.

use std::collections::BTreeMap;

use super::{check_period, ewm, IndicatorError, IndicatorSeries};
use crate::data::PriceSeries;

const NAME: &str = "EMA";

/// EMAs of close for several spans.
///
/// `EMA[0] = close[0]` and `EMA[t] = EMA[t-1] + a * (close[t] - EMA[t-1])`
/// with `a = 2 / (span + 1)`. There is no warm-up window, so every entry is
/// defined.
#[derive(Debug, Clone)]
pub struct ExponentialMovingAverages<'a> {
    series: &'a PriceSeries,
    spans: Vec<usize>,
    results: Option<BTreeMap<usize, IndicatorSeries>>,
}

impl<'a> ExponentialMovingAverages<'a> {
    pub fn new(series: &'a PriceSeries, spans: &[usize]) -> Result<Self, IndicatorError> {
        for &span in spans {
            check_period(NAME, span)?;
        }

        Ok(Self {
            series,
            spans: spans.to_vec(),
            results: None,
        })
    }

    pub fn spans(&self) -> &[usize] {
        &self.spans
    }

    pub fn run(&mut self) {
        let closes = self.series.closes();
        let dates = self.series.dates();

        let results = self
            .spans
            .iter()
            .map(|&span| {
                let values = ewm(&closes, span).into_iter().map(Some).collect();
                let name = format!("{NAME}_{span}");
                (span, IndicatorSeries::new(name, dates.clone(), values))
            })
            .collect();

        self.results = Some(results);
    }

    pub fn get_series(&self, span: usize) -> Result<&IndicatorSeries, IndicatorError> {
        let results = self.results.as_ref().ok_or(IndicatorError::NotRun(NAME))?;
        results.get(&span).ok_or(IndicatorError::UnknownPeriod {
            indicator: NAME,
            period: span,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PriceBar;
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2022, 6, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar::new(start + chrono::Days::new(i as u64), c, c, c, c, 10.0))
            .collect();
        PriceSeries::new("TEST", bars).unwrap()
    }

    #[test]
    fn test_known_values() {
        let data = series(&[10.0, 11.0, 12.0, 13.0]);
        let mut ema = ExponentialMovingAverages::new(&data, &[3]).unwrap();
        ema.run();

        // alpha = 0.5
        let out = ema.get_series(3).unwrap();
        let expected = [10.0, 10.5, 11.25, 12.125];
        for (i, e) in expected.iter().enumerate() {
            assert!((out.get(i).unwrap() - e).abs() < 1e-12);
        }
        assert_eq!(out.name(), "EMA_3");
    }

    #[test]
    fn test_first_value_is_first_close() {
        let data = series(&[42.0, 40.0]);
        let mut ema = ExponentialMovingAverages::new(&data, &[9, 20, 50]).unwrap();
        ema.run();
        for span in [9, 20, 50] {
            assert_eq!(ema.get_series(span).unwrap().get(0), Some(42.0));
        }
    }

    #[test]
    fn test_constant_series_stays_constant() {
        let data = series(&[5.0; 30]);
        let mut ema = ExponentialMovingAverages::new(&data, &[9]).unwrap();
        ema.run();
        assert!(ema
            .get_series(9)
            .unwrap()
            .values()
            .iter()
            .all(|v| (v.unwrap() - 5.0).abs() < 1e-12));
    }

    #[test]
    fn test_errors() {
        let data = series(&[1.0]);
        assert!(ExponentialMovingAverages::new(&data, &[0]).is_err());

        let ema = ExponentialMovingAverages::new(&data, &[9]).unwrap();
        assert_eq!(ema.get_series(9).unwrap_err(), IndicatorError::NotRun("EMA"));
    }
}
