//! Amortization engine: per-period principal and interest for each repayment regime

use crate::error::{BreakFundingError, Result};
use crate::loan::{AmortizationType, LoanTerms};
use crate::schedule::{build_schedule, PaymentSchedule};
use super::cashflows::CashflowVector;

/// Level per-period payment that retires `balance` over `periods` at `period_rate`
///
/// Ordinary annuity: A = B * r / (1 - (1 + r)^-n), or B / n when the rate is zero.
pub fn level_payment(balance: f64, period_rate: f64, periods: usize) -> f64 {
    if period_rate == 0.0 {
        return balance / periods as f64;
    }
    balance * period_rate / (1.0 - (1.0 + period_rate).powi(-(periods as i32)))
}

/// Produce principal and interest for every period of `schedule`
///
/// Amounts are rounded to cents as each period is produced. The running balance
/// is carried unrounded, so rounding differences are not corrected later.
pub fn amortize(
    schedule: &PaymentSchedule,
    balance: f64,
    period_rate: f64,
    method: AmortizationType,
) -> Result<CashflowVector> {
    if method == AmortizationType::Custom {
        return Err(BreakFundingError::NotImplemented("Custom amortization"));
    }

    let periods = schedule.periods();
    if periods == 0 {
        return Err(BreakFundingError::EmptySchedule);
    }

    log::debug!(
        "Amortizing {:.2} over {} periods at period rate {:.6} ({})",
        balance,
        periods,
        period_rate,
        method
    );

    let mut cashflows = CashflowVector::with_capacity(periods);

    match method {
        AmortizationType::InterestOnly => {
            let interest = balance * period_rate;
            for i in 0..periods {
                let principal = if i == periods - 1 { balance } else { 0.0 };
                cashflows.push(principal, interest);
            }
        }
        AmortizationType::Equal => {
            let payment = level_payment(balance, period_rate, periods);
            let mut running = balance;
            for _ in 0..periods {
                let interest = running * period_rate;
                let principal = payment - interest;
                cashflows.push(principal, interest);
                running -= principal;
            }
        }
        AmortizationType::Linear => {
            // Fixed from the original balance, not the reducing one
            let principal = balance / periods as f64;
            let mut running = balance;
            for _ in 0..periods {
                let interest = running * period_rate;
                cashflows.push(principal, interest);
                running -= principal;
            }
        }
        AmortizationType::Custom => unreachable!("custom amortization rejected above"),
    }

    Ok(cashflows)
}

/// Build the schedule and original cashflows for a set of loan terms
pub fn amortize_terms(terms: &LoanTerms) -> Result<(PaymentSchedule, CashflowVector)> {
    let schedule = build_schedule(terms.effective_date, terms.maturity_date, terms.frequency)?;
    let cashflows = amortize(&schedule, terms.balance, terms.period_rate(), terms.amortization_type)?;
    Ok((schedule, cashflows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::Frequency;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn quarterly_schedule() -> PaymentSchedule {
        build_schedule(date(2009, 7, 9), date(2013, 7, 9), Frequency::Quarterly).unwrap()
    }

    #[test]
    fn test_equal_quarterly_scenario() {
        let schedule = quarterly_schedule();
        let period_rate = 0.034 * 3.0 / 12.0;
        let cf = amortize(&schedule, 4_500_000.0, period_rate, AmortizationType::Equal).unwrap();

        assert_eq!(cf.periods(), 16);
        assert_abs_diff_eq!(cf.interest[0], 38_250.00, epsilon = 1e-6);

        let total: f64 = cf.principal.iter().sum();
        assert_abs_diff_eq!(total, 4_500_000.0, epsilon = 0.01 * 16.0);

        // Level payment: principal + interest is constant to the cent
        let payments = cf.total_payments();
        let first = payments[0];
        assert!(payments.iter().all(|p| (p - first).abs() <= 0.011));

        // Principal grows as interest shrinks
        assert!(cf.principal.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_equal_zero_rate() {
        let schedule = build_schedule(date(2020, 1, 1), date(2021, 1, 1), Frequency::Quarterly).unwrap();
        let cf = amortize(&schedule, 1_000.0, 0.0, AmortizationType::Equal).unwrap();
        assert_eq!(cf.principal, vec![250.0; 4]);
        assert_eq!(cf.interest, vec![0.0; 4]);
    }

    #[test]
    fn test_linear_constant_principal() {
        let schedule = quarterly_schedule();
        let cf = amortize(&schedule, 4_500_000.0, 0.0085, AmortizationType::Linear).unwrap();

        assert!(cf.principal.iter().all(|p| (*p - 281_250.0).abs() < 1e-9));
        assert_abs_diff_eq!(cf.principal.iter().sum::<f64>(), 4_500_000.0, epsilon = 0.16);

        // Interest on the reducing balance
        assert_abs_diff_eq!(cf.interest[0], 38_250.0, epsilon = 1e-6);
        assert_abs_diff_eq!(cf.interest[1], 35_859.38, epsilon = 0.006);
        assert_abs_diff_eq!(cf.interest[15], 2_390.63, epsilon = 0.006);
    }

    #[test]
    fn test_interest_only() {
        let schedule = quarterly_schedule();
        let cf = amortize(&schedule, 4_500_000.0, 0.0085, AmortizationType::InterestOnly).unwrap();

        let last = cf.periods() - 1;
        assert!(cf.principal[..last].iter().all(|p| *p == 0.0));
        assert_eq!(cf.principal[last], 4_500_000.0);
        assert!(cf.interest.iter().all(|i| (*i - 38_250.0).abs() < 1e-9));
    }

    #[test]
    fn test_custom_not_implemented() {
        let schedule = quarterly_schedule();
        assert!(matches!(
            amortize(&schedule, 4_500_000.0, 0.0085, AmortizationType::Custom),
            Err(BreakFundingError::NotImplemented(_))
        ));
    }

    #[test]
    fn test_empty_schedule() {
        let schedule = PaymentSchedule {
            frequency: Frequency::Monthly,
            dates: vec![date(2020, 1, 1)],
        };
        assert!(matches!(
            amortize(&schedule, 100.0, 0.01, AmortizationType::Linear),
            Err(BreakFundingError::EmptySchedule)
        ));
    }

    #[test]
    fn test_amortize_is_pure() {
        let schedule = quarterly_schedule();
        for method in [AmortizationType::InterestOnly, AmortizationType::Equal, AmortizationType::Linear] {
            let a = amortize(&schedule, 1_234_567.89, 0.0123, method).unwrap();
            let b = amortize(&schedule, 1_234_567.89, 0.0123, method).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_level_payment() {
        // 1000 over 12 months at 0.5% per month
        let payment = level_payment(1_000.0, 0.005, 12);
        assert_abs_diff_eq!(payment, 86.066, epsilon = 1e-3);
        assert_abs_diff_eq!(level_payment(1_200.0, 0.0, 12), 100.0);
    }
}
