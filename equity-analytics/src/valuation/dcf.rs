//! Three-stage discounted cash flow model.

use crate::data::FundamentalsSnapshot;

use super::types::{
    DcfValuation, GrowthAssumptions, GrowthStage, ValuationError, WaccTable, YearProjection,
    HORIZON_YEARS,
};

/// DCF fair-value estimator bound to one fundamentals snapshot.
///
/// Growth assumptions are fixed at construction. The discount rate is looked
/// up from beta on every call unless an override is set.
#[derive(Debug, Clone)]
pub struct DcfModel {
    fundamentals: FundamentalsSnapshot,
    growth: GrowthAssumptions,
    wacc: WaccTable,
    discount_rate_override: Option<f64>,
}

impl DcfModel {
    /// Create a model using the default beta table.
    pub fn new(fundamentals: FundamentalsSnapshot, growth: GrowthAssumptions) -> Self {
        Self {
            fundamentals,
            growth,
            wacc: WaccTable::default(),
            discount_rate_override: None,
        }
    }

    /// Replace the beta table.
    pub fn with_wacc_table(mut self, wacc: WaccTable) -> Self {
        self.wacc = wacc;
        self
    }

    /// Use a fixed discount rate instead of the beta lookup.
    pub fn with_discount_rate(mut self, rate: f64) -> Self {
        self.discount_rate_override = Some(rate);
        self
    }

    pub fn fundamentals(&self) -> &FundamentalsSnapshot {
        &self.fundamentals
    }

    pub fn growth(&self) -> &GrowthAssumptions {
        &self.growth
    }

    /// Discount rate that [`calc_fair_value`](Self::calc_fair_value) would apply.
    pub fn discount_rate(&self) -> Result<f64, ValuationError> {
        let rate = match self.discount_rate_override {
            Some(rate) => rate,
            None => {
                let beta = required(self.fundamentals.beta, "beta")?;
                self.wacc.lookup(beta)
            }
        };

        if !rate.is_finite() || rate <= -1.0 {
            return Err(ValuationError::InvalidDiscountRate(rate));
        }
        Ok(rate)
    }

    /// Project FCF over 20 years, discount it, and divide by shares outstanding.
    pub fn calc_fair_value(&self) -> Result<DcfValuation, ValuationError> {
        let fcf = required(self.fundamentals.free_cash_flow, "free_cash_flow")?;
        let cash = required(self.fundamentals.cash_and_equivalents, "cash_and_equivalents")?;
        let debt = required(self.fundamentals.total_debt, "total_debt")?;
        let shares = required(self.fundamentals.shares_outstanding, "shares_outstanding")?;

        if shares == 0.0 {
            return Err(ValuationError::ZeroSharesOutstanding);
        }
        if !self.growth.is_finite() {
            return Err(ValuationError::NonFiniteInput("growth"));
        }

        let discount_rate = self.discount_rate()?;
        let d = 1.0 / (1.0 + discount_rate);

        let mut projections = Vec::with_capacity(HORIZON_YEARS as usize);
        let mut projected_fcf = fcf;
        let mut discount_factor = 1.0;

        for year in 1..=HORIZON_YEARS {
            let Some(stage) = GrowthStage::for_year(year) else {
                break;
            };
            projected_fcf *= 1.0 + self.growth.rate(stage);
            discount_factor *= d;

            projections.push(YearProjection {
                year,
                stage,
                projected_fcf,
                discount_factor,
                discounted_fcf: projected_fcf * discount_factor,
            });
        }

        let discounted_fcf_sum: f64 = projections.iter().map(|p| p.discounted_fcf).sum();
        let present_value = cash - debt + discounted_fcf_sum;
        let fair_value = present_value / shares;

        if !discounted_fcf_sum.is_finite() || !fair_value.is_finite() {
            return Err(ValuationError::NonFiniteResult);
        }

        tracing::debug!(
            symbol = %self.fundamentals.symbol,
            discount_rate,
            present_value,
            fair_value,
            "DCF valuation complete"
        );

        Ok(DcfValuation {
            symbol: self.fundamentals.symbol.clone(),
            discount_rate,
            growth: self.growth,
            projections,
            discounted_fcf_sum,
            present_value,
            fair_value,
        })
    }
}

fn required(value: Option<f64>, name: &'static str) -> Result<f64, ValuationError> {
    let value = value.ok_or(ValuationError::MissingInput(name))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValuationError::NonFiniteInput(name))
    }
}

// ============================================================================
// Tests
// ============================================================================
