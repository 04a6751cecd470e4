//! Batch analysis over configured tickers.

pub mod report;
pub mod runner;

pub use report::{AnalysisReport, TickerReport};
pub use runner::BatchRunner;
