//! Prepayment adjuster: apply a lump prepayment to the principal track

use chrono::NaiveDate;

use crate::error::{BreakFundingError, Result};
use crate::schedule::PaymentSchedule;
use super::cashflows::{round_to_cents, AdjustedCashflow, CashflowVector};

/// Largest rounding drift one cent-rounded period can contribute
pub const ROUNDING_TOLERANCE_PER_PERIOD: f64 = 0.005;

/// Apply `prepayment_amount` on `prepayment_date` to the original cashflows
///
/// The prepayment retires principal from the final period backward toward the
/// first boundary on or after the prepayment date, zeroing tail periods before
/// touching earlier ones. Interest is carried over unchanged.
pub fn apply_prepayment(
    schedule: &PaymentSchedule,
    original: &CashflowVector,
    prepayment_date: NaiveDate,
    prepayment_amount: f64,
) -> Result<AdjustedCashflow> {
    let prepay_index = schedule
        .first_boundary_on_or_after(prepayment_date)
        .ok_or_else(|| BreakFundingError::PrepaymentBeyondMaturity {
            prepayment_date,
            maturity_date: schedule.maturity_date().unwrap_or(prepayment_date),
        })?;

    let remaining = original.remaining_principal_from(prepay_index);
    let remaining_periods = original.periods().saturating_sub(prepay_index);
    let tolerance = ROUNDING_TOLERANCE_PER_PERIOD * remaining_periods as f64;
    if prepayment_amount > remaining + tolerance {
        return Err(BreakFundingError::PrepaymentExceedsBalance {
            amount: prepayment_amount,
            remaining,
        });
    }

    let mut principal = original.principal.clone();
    let mut outstanding = prepayment_amount;

    for i in (prepay_index..principal.len()).rev() {
        if outstanding <= 0.0 {
            break;
        }
        let reduction = principal[i].min(outstanding);
        principal[i] = round_to_cents(principal[i] - reduction);
        outstanding -= reduction;
    }

    log::debug!(
        "Applied prepayment {:.2} from period {} (remaining principal {:.2}, unallocated {:.4})",
        prepayment_amount,
        prepay_index,
        remaining,
        outstanding.max(0.0)
    );

    Ok(AdjustedCashflow {
        prepay_index,
        prepayment_amount,
        cashflows: CashflowVector {
            principal,
            interest: original.interest.clone(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::amortize;
    use crate::loan::{AmortizationType, Frequency};
    use crate::schedule::build_schedule;
    use approx::assert_abs_diff_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn annual_schedule() -> PaymentSchedule {
        build_schedule(date(2020, 1, 1), date(2025, 1, 1), Frequency::Annual).unwrap()
    }

    fn flat_cashflows() -> CashflowVector {
        CashflowVector {
            principal: vec![100.0, 100.0, 100.0, 100.0, 100.0],
            interest: vec![25.0, 20.0, 15.0, 10.0, 5.0],
        }
    }

    #[test]
    fn test_backloaded_allocation() {
        let adjusted = apply_prepayment(&annual_schedule(), &flat_cashflows(), date(2021, 6, 1), 250.0).unwrap();

        // First boundary on or after 2021-06-01 is 2022-01-01
        assert_eq!(adjusted.prepay_index, 2);
        assert_eq!(adjusted.principal(), &[100.0, 100.0, 50.0, 0.0, 0.0]);
        assert_eq!(adjusted.interest(), &[25.0, 20.0, 15.0, 10.0, 5.0]);
    }

    #[test]
    fn test_exact_period_amount_stops_cleanly() {
        let adjusted = apply_prepayment(&annual_schedule(), &flat_cashflows(), date(2020, 1, 1), 100.0).unwrap();
        assert_eq!(adjusted.principal(), &[100.0, 100.0, 100.0, 100.0, 0.0]);
    }

    #[test]
    fn test_full_remaining_zeroes_tail() {
        let schedule = build_schedule(date(2009, 7, 9), date(2013, 7, 9), Frequency::Quarterly).unwrap();
        let original = amortize(&schedule, 4_500_000.0, 0.0085, AmortizationType::Equal).unwrap();

        let index = 6;
        let remaining = original.remaining_principal_from(index);
        let adjusted = apply_prepayment(&schedule, &original, schedule.dates[index], remaining).unwrap();

        assert_eq!(adjusted.prepay_index, index);
        assert_eq!(&adjusted.principal()[..index], &original.principal[..index]);
        assert!(adjusted.principal()[index..].iter().all(|p| p.abs() < 1e-9));
    }

    #[test]
    fn test_sum_invariant_and_non_negative() {
        let schedule = build_schedule(date(2015, 3, 31), date(2025, 3, 31), Frequency::Monthly).unwrap();
        let original = amortize(&schedule, 750_000.0, 0.045 / 12.0, AmortizationType::Linear).unwrap();
        let before: f64 = original.principal.iter().sum();

        for amount in [0.0, 0.01, 6_250.0, 123_456.78, 300_000.0] {
            let adjusted = apply_prepayment(&schedule, &original, date(2019, 11, 15), amount).unwrap();
            let after: f64 = adjusted.principal().iter().sum();
            assert_abs_diff_eq!(after, before - amount, epsilon = 1e-6);
            assert!(adjusted.principal().iter().all(|p| *p >= 0.0));
        }
    }

    #[test]
    fn test_zero_prepayment_is_identity() {
        let adjusted = apply_prepayment(&annual_schedule(), &flat_cashflows(), date(2022, 1, 1), 0.0).unwrap();
        assert_eq!(adjusted.cashflows, flat_cashflows());
    }

    #[test]
    fn test_prepayment_beyond_maturity() {
        let result = apply_prepayment(&annual_schedule(), &flat_cashflows(), date(2025, 1, 2), 10.0);
        assert!(matches!(result, Err(BreakFundingError::PrepaymentBeyondMaturity { .. })));
    }

    #[test]
    fn test_prepayment_exceeds_balance() {
        let result = apply_prepayment(&annual_schedule(), &flat_cashflows(), date(2023, 1, 1), 200.5);
        match result {
            Err(BreakFundingError::PrepaymentExceedsBalance { remaining, .. }) => {
                assert_abs_diff_eq!(remaining, 200.0)
            }
            other => panic!("expected PrepaymentExceedsBalance, got {:?}", other),
        }
    }

    #[test]
    fn test_prepayment_on_maturity_date() {
        // Maturity boundary exists but no principal remains after it
        let schedule = annual_schedule();
        let adjusted = apply_prepayment(&schedule, &flat_cashflows(), date(2025, 1, 1), 0.0).unwrap();
        assert_eq!(adjusted.prepay_index, 5);

        let result = apply_prepayment(&schedule, &flat_cashflows(), date(2025, 1, 1), 1.0);
        assert!(matches!(result, Err(BreakFundingError::PrepaymentExceedsBalance { .. })));
    }
}
