//! Batch runner.
//!
//! Loads each configured ticker from a provider, runs the DCF model and every
//! indicator, and collects an [`AnalysisReport`]. A failure for one ticker is
//! logged and recorded in its [`TickerReport`]; the batch always continues.

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use equity_common::config::{Config, IndicatorSettings, ValuationSettings};
use equity_common::logging::generate_run_id;
use tracing::{debug, info, info_span, warn};

use super::report::{AnalysisReport, TickerReport};
use crate::data::{MarketDataProvider, PriceSeries};
use crate::indicators::{ExponentialMovingAverages, Rsi, SimpleMovingAverages, Vwap};
use crate::valuation::{DcfModel, DcfValuation, GrowthAssumptions};

/// Runs the full analysis for a list of tickers.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    tickers: Vec<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    valuation: ValuationSettings,
    indicators: IndicatorSettings,
    run_id: Option<String>,
}

impl BatchRunner {
    /// Take tickers, date range and model settings from a configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            tickers: config.tickers.iter().map(|t| t.to_uppercase()).collect(),
            start_date: config.data.start_date,
            end_date: config.data.end_date,
            valuation: config.valuation.clone(),
            indicators: config.indicators.clone(),
            run_id: None,
        }
    }

    /// Use a fixed run id instead of generating one.
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// Analyse every ticker in order.
    pub fn run(&self, provider: &dyn MarketDataProvider) -> AnalysisReport {
        let run_id = self.run_id.clone().unwrap_or_else(generate_run_id);
        let span = info_span!("analysis_run", run_id = %run_id, provider = provider.name());
        let _guard = span.enter();

        info!(
            tickers = self.tickers.len(),
            as_of = %self.valuation.as_of_date,
            "Starting analysis run"
        );

        let tickers: Vec<TickerReport> = self
            .tickers
            .iter()
            .map(|symbol| self.analyse_ticker(symbol, provider))
            .collect();

        let report = AnalysisReport {
            run_id,
            as_of: self.valuation.as_of_date,
            provider: provider.name().to_string(),
            tickers,
        };

        info!(
            tickers = report.tickers.len(),
            valued = report.valued_count(),
            "Analysis run complete"
        );

        report
    }

    /// Analyse a single ticker.
    pub fn analyse_ticker(&self, symbol: &str, provider: &dyn MarketDataProvider) -> TickerReport {
        let span = info_span!("ticker", symbol = %symbol);
        let _guard = span.enter();

        let mut report = TickerReport::new(symbol);

        match provider.daily_prices(symbol, self.start_date, self.end_date) {
            Ok(Some(series)) if !series.is_empty() => self.fill_indicators(&series, &mut report),
            Ok(_) => {
                warn!("No price data");
                report.errors.push("no price data".into());
            }
            Err(e) => {
                warn!(error = %e, "Failed to load prices");
                report.errors.push(format!("prices: {e}"));
            }
        }

        match self.value(symbol, provider) {
            Ok(valuation) => {
                report.fair_value = Some(valuation.fair_value);
                report.discount_rate = Some(valuation.discount_rate);
                report.upside_pct = report
                    .last_close
                    .and_then(|price| valuation.upside_pct(price));
            }
            Err(e) => {
                let reason = format!("{e:#}");
                warn!(reason = %reason, "Valuation unavailable");
                report.valuation_unavailable = Some(reason);
            }
        }

        info!(
            fair_value = ?report.fair_value,
            last_close = ?report.last_close,
            rsi = ?report.rsi,
            errors = report.errors.len(),
            "Ticker analysed"
        );

        report
    }

    fn value(&self, symbol: &str, provider: &dyn MarketDataProvider) -> Result<DcfValuation> {
        let short_term = self
            .valuation
            .short_term_growth(symbol)
            .ok_or_else(|| anyhow!("no growth estimate for {symbol}"))?;

        let growth = GrowthAssumptions::from_short_term(
            short_term,
            self.valuation.medium_term_ratio,
            self.valuation.long_term_growth,
        );

        let fundamentals = provider
            .fundamentals(symbol, self.valuation.as_of_date)
            .context("failed to load fundamentals")?
            .ok_or_else(|| anyhow!("no fundamentals"))?;

        // beta only feeds the rate lookup
        let overridden = self.valuation.discount_rate_override.is_some();
        let missing: Vec<&str> = fundamentals
            .missing_fields()
            .into_iter()
            .filter(|field| !(overridden && *field == "beta"))
            .collect();
        if !missing.is_empty() {
            bail!("missing fundamentals: {}", missing.join(", "));
        }

        let mut model = DcfModel::new(fundamentals, growth);
        if let Some(rate) = self.valuation.discount_rate_override {
            model = model.with_discount_rate(rate);
        }

        Ok(model.calc_fair_value()?)
    }

    fn fill_indicators(&self, series: &PriceSeries, report: &mut TickerReport) {
        let settings = &self.indicators;

        report.price_bars = series.len();
        if let Some(last) = series.last() {
            report.last_date = Some(last.date);
            report.last_close = Some(last.close);
        }

        match SimpleMovingAverages::new(series, &settings.sma_periods) {
            Ok(mut sma) => match sma.run_named(&settings.sma_price_field) {
                Ok(()) => {
                    for &period in sma.periods() {
                        let latest = sma.get_series(period).ok().and_then(|s| s.latest());
                        report.sma.insert(period, latest);
                    }
                }
                Err(e) => record(report, "sma", &e),
            },
            Err(e) => record(report, "sma", &e),
        }

        match ExponentialMovingAverages::new(series, &settings.ema_spans) {
            Ok(mut ema) => {
                ema.run();
                for &span in ema.spans() {
                    let latest = ema.get_series(span).ok().and_then(|s| s.latest());
                    report.ema.insert(span, latest);
                }
            }
            Err(e) => record(report, "ema", &e),
        }

        match Rsi::new(series, settings.rsi_period) {
            Ok(mut rsi) => {
                rsi.run();
                report.rsi = rsi.get_series().ok().and_then(|s| s.latest());
            }
            Err(e) => record(report, "rsi", &e),
        }

        if settings.vwap {
            let mut vwap = Vwap::new(series);
            vwap.run();
            report.vwap = vwap.get_series().ok().and_then(|s| s.latest());
        }

        debug!(bars = series.len(), "Indicators computed");
    }
}

fn record(report: &mut TickerReport, indicator: &str, error: &dyn std::fmt::Display) {
    warn!(indicator, error = %error, "Indicator failed");
    report.errors.push(format!("{indicator}: {error}"));
}
