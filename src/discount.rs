//! Discount curves for break-funding present values
//!
//! Supports:
//! - A synthetic SOFR-like placeholder ramp (base rate plus a bump per period)
//! - A single flat annual rate
//!
//! Both share the same time grid: period `i` sits `i * months_per_period`
//! calendar months after the anchor date, measured Actual/365 in whole days.
//! A market curve plugs in by implementing `DiscountCurve`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::CurveConfig;
use crate::error::Result;
use crate::schedule::add_months;

/// Source of per-period discount factors anchored at a valuation date
pub trait DiscountCurve: Send + Sync {
    /// One discount factor per period, `factor[0]` at the anchor itself
    fn discount_factors(
        &self,
        anchor: NaiveDate,
        periods: usize,
        months_per_period: u32,
    ) -> Result<Vec<f64>>;

    /// Short description for logs and reports
    fn describe(&self) -> String;
}

/// Actual/365 year fraction between two dates in whole days
pub fn year_fraction_act365(from: NaiveDate, to: NaiveDate) -> f64 {
    (to - from).num_days() as f64 / 365.0
}

/// Year fraction from `anchor` to the start of each period on the curve grid
///
/// Each point is offset from the anchor directly (not chained), so month-end
/// clamping does not accumulate.
pub fn period_year_fractions(anchor: NaiveDate, periods: usize, months_per_period: u32) -> Result<Vec<f64>> {
    (0..periods)
        .map(|i| {
            let future = add_months(anchor, i as u32 * months_per_period)?;
            Ok(year_fraction_act365(anchor, future))
        })
        .collect()
}

/// Placeholder SOFR-like curve: rate_i = base_rate + step * i, annually compounded
///
/// Not a market curve. It stands in until a real curve source is wired up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyntheticSofrCurve {
    /// Rate for period 0 (decimal, 0.05 = 5%)
    pub base_rate: f64,

    /// Added to the rate for every period index
    pub step: f64,
}

impl SyntheticSofrCurve {
    pub fn new(base_rate: f64, step: f64) -> Self {
        Self { base_rate, step }
    }

    pub fn from_config(config: &CurveConfig) -> Self {
        Self::new(config.base_rate, config.step)
    }

    /// Rate applied at period index `i`
    pub fn rate_at(&self, i: usize) -> f64 {
        self.base_rate + self.step * i as f64
    }
}

impl Default for SyntheticSofrCurve {
    fn default() -> Self {
        Self::new(0.05, 0.0005)
    }
}

impl DiscountCurve for SyntheticSofrCurve {
    fn discount_factors(&self, anchor: NaiveDate, periods: usize, months_per_period: u32) -> Result<Vec<f64>> {
        let times = period_year_fractions(anchor, periods, months_per_period)?;
        Ok(times
            .iter()
            .enumerate()
            .map(|(i, t)| 1.0 / (1.0 + self.rate_at(i)).powf(*t))
            .collect())
    }

    fn describe(&self) -> String {
        format!(
            "synthetic SOFR ramp (base {:.4}%, step {:.4}%)",
            self.base_rate * 100.0,
            self.step * 100.0
        )
    }
}

/// Single annually-compounded rate on the same Act/365 grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlatCurve {
    pub annual_rate: f64,
}

impl FlatCurve {
    pub fn new(annual_rate: f64) -> Self {
        Self { annual_rate }
    }
}

impl DiscountCurve for FlatCurve {
    fn discount_factors(&self, anchor: NaiveDate, periods: usize, months_per_period: u32) -> Result<Vec<f64>> {
        let times = period_year_fractions(anchor, periods, months_per_period)?;
        Ok(times
            .iter()
            .map(|t| (1.0 + self.annual_rate).powf(-t))
            .collect())
    }

    fn describe(&self) -> String {
        format!("flat {:.4}%", self.annual_rate * 100.0)
    }
}

/// Sum of `amounts[i] * factors[i]` over the common length
pub fn present_value(amounts: &[f64], factors: &[f64]) -> f64 {
    amounts.iter().zip(factors).map(|(a, df)| a * df).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_synthetic_curve_factors() {
        let curve = SyntheticSofrCurve::default();
        let anchor = date(2011, 7, 9);
        let dfs = curve.discount_factors(anchor, 4, 3).unwrap();

        assert_eq!(dfs.len(), 4);
        assert_abs_diff_eq!(dfs[0], 1.0);

        // 2011-07-09 -> 2011-10-09 is 92 days, rate 5.05%
        let expected = 1.0 / 1.0505_f64.powf(92.0 / 365.0);
        assert_relative_eq!(dfs[1], expected, epsilon = 1e-12);

        assert!(dfs.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn test_flat_curve() {
        let curve = FlatCurve::new(0.06);
        let dfs = curve.discount_factors(date(2021, 1, 1), 2, 12).unwrap();
        assert_abs_diff_eq!(dfs[0], 1.0);
        assert_relative_eq!(dfs[1], 1.0 / 1.06, epsilon = 1e-12);
    }

    #[test]
    fn test_year_fractions_are_not_chained() {
        // Offsets from a month-end anchor clamp independently
        let times = period_year_fractions(date(2021, 1, 31), 3, 1).unwrap();
        assert_abs_diff_eq!(times[1], 28.0 / 365.0);
        assert_abs_diff_eq!(times[2], 59.0 / 365.0);
    }

    #[test]
    fn test_present_value() {
        let pv = present_value(&[100.0, 100.0, 50.0], &[1.0, 0.5]);
        assert_abs_diff_eq!(pv, 150.0);
    }

    #[test]
    fn test_rate_ramp() {
        let curve = SyntheticSofrCurve::new(0.03, 0.001);
        assert_abs_diff_eq!(curve.rate_at(10), 0.04, epsilon = 1e-12);
        assert!(curve.describe().contains("3.0000%"));
    }
}
