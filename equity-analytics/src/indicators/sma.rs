//! Simple moving averages.

use statrs::statistics::Statistics;
use std::collections::BTreeMap;

use super::{check_period, IndicatorError, IndicatorSeries};
use crate::data::{PriceField, PriceSeries};

const NAME: &str = "SMA";

/// Trailing means over several window lengths of one price field.
#[derive(Debug, Clone)]
pub struct SimpleMovingAverages<'a> {
    series: &'a PriceSeries,
    periods: Vec<usize>,
    results: Option<(PriceField, BTreeMap<usize, IndicatorSeries>)>,
}

impl<'a> SimpleMovingAverages<'a> {
    /// Bind to a series. Every period must be at least 1.
    pub fn new(series: &'a PriceSeries, periods: &[usize]) -> Result<Self, IndicatorError> {
        for &period in periods {
            check_period(NAME, period)?;
        }

        Ok(Self {
            series,
            periods: periods.to_vec(),
            results: None,
        })
    }

    pub fn periods(&self) -> &[usize] {
        &self.periods
    }

    /// Compute every configured window over `field`.
    pub fn run(&mut self, field: PriceField) {
        let values = self.series.values(field);
        let dates = self.series.dates();

        let results = self
            .periods
            .iter()
            .map(|&period| {
                let sma = trailing_mean(&values, period);
                let name = format!("{NAME}_{period}");
                (period, IndicatorSeries::new(name, dates.clone(), sma))
            })
            .collect();

        tracing::trace!(
            symbol = %self.series.symbol(),
            field = %field,
            periods = ?self.periods,
            "Computed SMAs"
        );

        self.results = Some((field, results));
    }

    /// Like [`run`](Self::run) with the field given by name (`"Close"`,
    /// `"volume"`, ...). An unknown name fails before anything is computed.
    pub fn run_named(&mut self, field: &str) -> Result<(), IndicatorError> {
        let field: PriceField = field.parse()?;
        self.run(field);
        Ok(())
    }

    /// Field the last run used.
    pub fn field(&self) -> Option<PriceField> {
        self.results.as_ref().map(|(field, _)| *field)
    }

    /// Result for one configured period.
    pub fn get_series(&self, period: usize) -> Result<&IndicatorSeries, IndicatorError> {
        let (_, results) = self.results.as_ref().ok_or(IndicatorError::NotRun(NAME))?;
        results.get(&period).ok_or(IndicatorError::UnknownPeriod {
            indicator: NAME,
            period,
        })
    }
}

fn trailing_mean(values: &[f64], period: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                None
            } else {
                Some(values[i + 1 - period..=i].iter().mean())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PriceBar;
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> PriceSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap() + chrono::Days::new(i as u64);
                PriceBar::new(date, c - 1.0, c + 1.0, c - 2.0, c, 100.0 * (i + 1) as f64)
            })
            .collect();
        PriceSeries::new("TEST", bars).unwrap()
    }

    #[test]
    fn test_window_fill() {
        let data = series(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let mut sma = SimpleMovingAverages::new(&data, &[3]).unwrap();
        sma.run(PriceField::Close);

        let out = sma.get_series(3).unwrap();
        assert_eq!(out.name(), "SMA_3");
        assert_eq!(out.get(0), None);
        assert_eq!(out.get(1), None);
        assert!((out.get(2).unwrap() - 2.0).abs() < 1e-12);
        assert!((out.get(4).unwrap() - 4.0).abs() < 1e-12);
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn test_period_longer_than_series() {
        let data = series(&[1.0, 2.0]);
        let mut sma = SimpleMovingAverages::new(&data, &[200]).unwrap();
        sma.run(PriceField::Close);
        let out = sma.get_series(200).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.latest(), None);
    }

    #[test]
    fn test_named_fields() {
        let data = series(&[1.0, 2.0, 3.0]);
        let mut sma = SimpleMovingAverages::new(&data, &[2]).unwrap();

        sma.run_named("volume").unwrap();
        assert_eq!(sma.field(), Some(PriceField::Volume));
        assert!((sma.get_series(2).unwrap().latest().unwrap() - 250.0).abs() < 1e-9);

        sma.run_named("High").unwrap();
        assert!((sma.get_series(2).unwrap().latest().unwrap() - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_field_fails_before_run() {
        let data = series(&[1.0, 2.0, 3.0]);
        let mut sma = SimpleMovingAverages::new(&data, &[2]).unwrap();
        let err = sma.run_named("Adj Close").unwrap_err();
        assert!(matches!(err, IndicatorError::Series(_)));
        assert_eq!(sma.get_series(2).unwrap_err(), IndicatorError::NotRun("SMA"));
    }

    #[test]
    fn test_errors() {
        let data = series(&[1.0]);
        assert!(matches!(
            SimpleMovingAverages::new(&data, &[9, 0]),
            Err(IndicatorError::InvalidPeriod { period: 0, .. })
        ));

        let mut sma = SimpleMovingAverages::new(&data, &[9]).unwrap();
        assert_eq!(sma.get_series(9).unwrap_err(), IndicatorError::NotRun("SMA"));
        sma.run(PriceField::Close);
        assert!(matches!(
            sma.get_series(20),
            Err(IndicatorError::UnknownPeriod { period: 20, .. })
        ));
    }

    #[test]
    fn test_empty_series() {
        let data = PriceSeries::empty("NONE");
        let mut sma = SimpleMovingAverages::new(&data, &[1]).unwrap();
        sma.run(PriceField::Close);
        assert!(sma.get_series(1).unwrap().is_empty());
    }
}
