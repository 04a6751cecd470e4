//! Valuation Types.
//!
//! Inputs and outputs of the three-stage DCF model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Last year of the short-term stage.
pub const SHORT_TERM_END: u32 = 5;
/// Last year of the medium-term stage.
pub const MEDIUM_TERM_END: u32 = 10;
/// Number of projected years.
pub const HORIZON_YEARS: u32 = 20;

// ============================================================================
// Errors
// ============================================================================

/// Why a fair value could not be produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValuationError {
    /// A required fundamental was not supplied
    #[error("Missing fundamental: {0}")]
    MissingInput(&'static str),

    /// An input was NaN or infinite
    #[error("Non-finite input: {0}")]
    NonFiniteInput(&'static str),

    /// Division by zero shares
    #[error("Shares outstanding is zero")]
    ZeroSharesOutstanding,

    /// Discount rate at or below -100%
    #[error("Invalid discount rate {0}")]
    InvalidDiscountRate(f64),

    /// The arithmetic overflowed or produced NaN
    #[error("Valuation produced a non-finite result")]
    NonFiniteResult,
}

// ============================================================================
// Growth Assumptions
// ============================================================================

/// Projection stage a year falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthStage {
    /// Years 1-5
    ShortTerm,
    /// Years 6-10
    MediumTerm,
    /// Years 11-20
    LongTerm,
}

impl GrowthStage {
    /// Stage for a projection year (1-based). `None` outside the horizon.
    pub fn for_year(year: u32) -> Option<Self> {
        match year {
            1..=SHORT_TERM_END => Some(Self::ShortTerm),
            6..=MEDIUM_TERM_END => Some(Self::MediumTerm),
            11..=HORIZON_YEARS => Some(Self::LongTerm),
            _ => None,
        }
    }
}

impl std::fmt::Display for GrowthStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ShortTerm => write!(f, "short-term"),
            Self::MediumTerm => write!(f, "medium-term"),
            Self::LongTerm => write!(f, "long-term"),
        }
    }
}

/// Annual FCF growth rates for the three stages, as fractions (0.05 = 5%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthAssumptions {
    pub short_term: f64,
    pub medium_term: f64,
    pub long_term: f64,
}

impl GrowthAssumptions {
    pub fn new(short_term: f64, medium_term: f64, long_term: f64) -> Self {
        Self {
            short_term,
            medium_term,
            long_term,
        }
    }

    /// Derive the medium-term rate as `short_term * medium_ratio`.
    ///
    /// With a 5-year EPS estimate of 12.46%, a ratio of 0.5 and 4% long-term
    /// this gives 12.46% / 6.23% / 4%.
    pub fn from_short_term(short_term: f64, medium_ratio: f64, long_term: f64) -> Self {
        Self::new(short_term, short_term * medium_ratio, long_term)
    }

    /// Same rate in every stage.
    pub fn constant(rate: f64) -> Self {
        Self::new(rate, rate, rate)
    }

    /// Rate for one stage.
    pub fn rate(&self, stage: GrowthStage) -> f64 {
        match stage {
            GrowthStage::ShortTerm => self.short_term,
            GrowthStage::MediumTerm => self.medium_term,
            GrowthStage::LongTerm => self.long_term,
        }
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.short_term.is_finite() && self.medium_term.is_finite() && self.long_term.is_finite()
    }
}

// ============================================================================
// Discount Rate Table
// ============================================================================

/// One band of the beta table: betas strictly below `beta_below` map to `rate`
/// unless an earlier band already matched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaccStep {
    pub beta_below: f64,
    pub rate: f64,
}

/// Beta-indexed discount rate lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaccTable {
    steps: Vec<WaccStep>,
    fallback: f64,
}

impl Default for WaccTable {
    fn default() -> Self {
        let steps = [
            (0.80, 0.05),
            (1.00, 0.06),
            (1.10, 0.065),
            (1.20, 0.07),
            (1.30, 0.075),
            (1.50, 0.08),
            (1.60, 0.085),
        ]
        .iter()
        .map(|&(beta_below, rate)| WaccStep { beta_below, rate })
        .collect();

        Self {
            steps,
            fallback: 0.09,
        }
    }
}

impl WaccTable {
    /// Build a table; bands are ordered by their upper bound.
    pub fn new(mut steps: Vec<WaccStep>, fallback: f64) -> Self {
        steps.sort_by(|a, b| a.beta_below.total_cmp(&b.beta_below));
        Self { steps, fallback }
    }

    /// Discount rate for a beta.
    pub fn lookup(&self, beta: f64) -> f64 {
        self.steps
            .iter()
            .find(|step| beta < step.beta_below)
            .map_or(self.fallback, |step| step.rate)
    }

    pub fn steps(&self) -> &[WaccStep] {
        &self.steps
    }

    /// Rate for betas above every band
    pub fn fallback(&self) -> f64 {
        self.fallback
    }
}

// ============================================================================
// Results
// ============================================================================

/// One projected year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearProjection {
    /// Projection year, 1-based
    pub year: u32,
    pub stage: GrowthStage,
    /// Undiscounted FCF for the year
    pub projected_fcf: f64,
    /// `1 / (1 + r)^year`
    pub discount_factor: f64,
    /// `projected_fcf * discount_factor`
    pub discounted_fcf: f64,
}

/// Complete DCF result for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfValuation {
    pub symbol: String,
    /// Discount rate actually applied
    pub discount_rate: f64,
    pub growth: GrowthAssumptions,
    /// Years 1 through 20
    pub projections: Vec<YearProjection>,
    /// Sum of discounted FCF over the horizon
    pub discounted_fcf_sum: f64,
    /// Cash - debt + discounted FCF sum
    pub present_value: f64,
    /// Present value per share
    pub fair_value: f64,
}

impl DcfValuation {
    /// Percent by which fair value exceeds `price`. `None` for non-positive prices.
    pub fn upside_pct(&self, price: f64) -> Option<f64> {
        if price > 0.0 && price.is_finite() {
            Some((self.fair_value / price - 1.0) * 100.0)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_boundaries() {
        assert_eq!(GrowthStage::for_year(0), None);
        assert_eq!(GrowthStage::for_year(1), Some(GrowthStage::ShortTerm));
        assert_eq!(GrowthStage::for_year(5), Some(GrowthStage::ShortTerm));
        assert_eq!(GrowthStage::for_year(6), Some(GrowthStage::MediumTerm));
        assert_eq!(GrowthStage::for_year(10), Some(GrowthStage::MediumTerm));
        assert_eq!(GrowthStage::for_year(11), Some(GrowthStage::LongTerm));
        assert_eq!(GrowthStage::for_year(20), Some(GrowthStage::LongTerm));
        assert_eq!(GrowthStage::for_year(21), None);
    }

    #[test]
    fn test_growth_from_short_term() {
        let g = GrowthAssumptions::from_short_term(0.1246, 0.5, 0.04);
        assert!((g.medium_term - 0.0623).abs() < 1e-12);
        assert!((g.rate(GrowthStage::LongTerm) - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_custom_table_sorted() {
        let table = WaccTable::new(
            vec![
                WaccStep {
                    beta_below: 2.0,
                    rate: 0.10,
                },
                WaccStep {
                    beta_below: 1.0,
                    rate: 0.04,
                },
            ],
            0.12,
        );
        assert!((table.lookup(0.5) - 0.04).abs() < 1e-12);
        assert!((table.lookup(1.5) - 0.10).abs() < 1e-12);
        assert!((table.lookup(2.0) - 0.12).abs() < 1e-12);
    }

    #[test]
    fn test_upside() {
        let valuation = DcfValuation {
            symbol: "X".into(),
            discount_rate: 0.0,
            growth: GrowthAssumptions::constant(0.0),
            projections: Vec::new(),
            discounted_fcf_sum: 0.0,
            present_value: 0.0,
            fair_value: 150.0,
        };
        assert!((valuation.upside_pct(100.0).unwrap() - 50.0).abs() < 1e-9);
        assert_eq!(valuation.upside_pct(0.0), None);
    }
}
