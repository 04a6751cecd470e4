//! Equity Analytics Library
//!
//! Fair-value estimation and technical analysis over daily equity data.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         equity-analytics                            │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────┐      │
//! │  │  Market Data    │  │  Valuation      │  │  Indicators     │      │
//! │  │  Providers      │─▶│  (3-stage DCF)  │  │  SMA/EMA/RSI/   │      │
//! │  │                 │─▶│                 │  │  VWAP           │      │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────┘      │
//! │            └──────────────── Batch Runner ──────────┘               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Concepts
//!
//! ## Valuation
//! - Discount rate looked up from beta (5%-9%)
//! - Free cash flow projected over 20 years in three growth stages
//! - Fair value = (cash - debt + discounted FCF) / shares outstanding
//!
//! ## Indicators
//! - Outputs are aligned with the input dates; undefined entries are `None`
//! - Calculators are built, run once, then queried
//!
//! The calculation modules never touch the filesystem. Data reaches them
//! through a [`data::MarketDataProvider`].

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod analysis;
pub mod data;
pub mod indicators;
pub mod valuation;

pub use analysis::{AnalysisReport, BatchRunner, TickerReport};
pub use data::{
    FundamentalsSnapshot, InMemoryProvider, MarketDataProvider, PriceBar, PriceField, PriceSeries,
    SnapshotProvider,
};
pub use indicators::{ExponentialMovingAverages, IndicatorSeries, Rsi, SimpleMovingAverages, Vwap};
pub use valuation::{DcfModel, DcfValuation, GrowthAssumptions, ValuationError};
