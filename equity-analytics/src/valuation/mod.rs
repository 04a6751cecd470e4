//! Valuation Module.
//!
//! Three-stage discounted cash flow (DCF) fair value per share.
//!
//! # Model
//!
//! 1. Discount rate from beta via a step table (5% below 0.80 up to 9% at 1.60+)
//! 2. FCF grows at the short-term rate in years 1-5, medium-term in 6-10 and
//!    long-term in 11-20
//! 3. Each year is discounted by `1 / (1 + r)^year`
//! 4. Present value = cash - debt + discounted FCF sum
//! 5. Fair value = present value / shares outstanding
//!
//! Any missing or degenerate input yields a [`ValuationError`]; there are no
//! partial results.
//!
//! # Usage
//!
//! ```ignore
//! use equity_analytics::valuation::{DcfModel, GrowthAssumptions};
//!
//! let growth = GrowthAssumptions::from_short_term(0.1246, 0.5, 0.04);
//! let valuation = DcfModel::new(snapshot, growth).calc_fair_value()?;
//!
//! println!("Fair value: {:.2}", valuation.fair_value);
//! ```

pub mod dcf;
pub mod types;

pub use dcf::DcfModel;
pub use types::{
    DcfValuation, GrowthAssumptions, GrowthStage, ValuationError, WaccStep, WaccTable,
    YearProjection, HORIZON_YEARS, MEDIUM_TERM_END, SHORT_TERM_END,
};
