//! Break-funding calculator
//!
//! Nets the discounted original schedule against the discounted prepaid
//! schedule. A positive cost means the original schedule is worth more than
//! the prepaid one at the prepayment date.

use serde::Serialize;

use crate::amortization::{amortize_terms, apply_prepayment, round_to_cents, AdjustedCashflow, CashflowVector};
use crate::config::CurveConfig;
use crate::discount::{present_value, DiscountCurve, SyntheticSofrCurve};
use crate::error::Result;
use crate::loan::LoanTerms;
use crate::schedule::PaymentSchedule;

/// Everything produced while computing one break-funding figure
#[derive(Debug, Clone, Serialize)]
pub struct BreakFundingResult {
    pub terms: LoanTerms,
    pub schedule: PaymentSchedule,
    pub original: CashflowVector,
    pub adjusted: AdjustedCashflow,
    pub discount_factors: Vec<f64>,
    pub curve: String,
    pub pv_original: f64,
    pub pv_adjusted: f64,

    /// round(pv_original - pv_adjusted, 2); may be negative
    pub cost: f64,
}

/// Orchestrates scheduling, amortization, prepayment and discounting
pub struct BreakFundingCalculator {
    curve: Box<dyn DiscountCurve>,
}

impl BreakFundingCalculator {
    /// Create a calculator discounting with the given curve
    pub fn new<C: DiscountCurve + 'static>(curve: C) -> Self {
        Self { curve: Box::new(curve) }
    }

    /// Calculator on the synthetic curve built from `config`
    pub fn from_config(config: &CurveConfig) -> Self {
        Self::new(SyntheticSofrCurve::from_config(config))
    }

    pub fn curve(&self) -> &dyn DiscountCurve {
        self.curve.as_ref()
    }

    /// Run the full computation for one loan
    ///
    /// Any failure aborts the computation; no partial result is returned.
    pub fn calculate(&self, terms: &LoanTerms) -> Result<BreakFundingResult> {
        terms.validate()?;

        let (schedule, original) = amortize_terms(terms)?;
        let adjusted = apply_prepayment(&schedule, &original, terms.prepayment_date, terms.prepayment_amount)?;

        let discount_factors = self.curve.discount_factors(
            terms.prepayment_date,
            original.periods(),
            terms.frequency.months_per_period(),
        )?;

        let pv_original = present_value(&original.total_payments(), &discount_factors);
        let pv_adjusted = present_value(&adjusted.cashflows.total_payments(), &discount_factors);
        let cost = round_to_cents(pv_original - pv_adjusted);

        log::info!(
            "Break-funding cost {:.2} (PV original {:.2}, PV adjusted {:.2}, {} periods, {})",
            cost,
            pv_original,
            pv_adjusted,
            original.periods(),
            self.curve.describe()
        );

        Ok(BreakFundingResult {
            terms: terms.clone(),
            schedule,
            original,
            adjusted,
            discount_factors,
            curve: self.curve.describe(),
            pv_original,
            pv_adjusted,
            cost,
        })
    }
}

impl Default for BreakFundingCalculator {
    fn default() -> Self {
        Self::new(SyntheticSofrCurve::default())
    }
}

/// Break-funding cost of `terms` on the default synthetic curve, rounded to cents
pub fn compute_break_funding_cost(terms: &LoanTerms) -> Result<f64> {
    BreakFundingCalculator::default()
        .calculate(terms)
        .map(|result| result.cost)
}
