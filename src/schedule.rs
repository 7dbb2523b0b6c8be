//! Period scheduler: payment boundary dates between effective date and maturity

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{BreakFundingError, Result};
use crate::loan::Frequency;

/// Ordered period boundary dates of a loan
///
/// `dates[0]` is the effective date and the last entry is the maturity date.
/// Period `i` runs from `dates[i]` to `dates[i + 1]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSchedule {
    pub frequency: Frequency,
    pub dates: Vec<NaiveDate>,
}

impl PaymentSchedule {
    /// Number of payment periods
    pub fn periods(&self) -> usize {
        self.dates.len().saturating_sub(1)
    }

    /// Start date of every period
    pub fn period_starts(&self) -> &[NaiveDate] {
        &self.dates[..self.periods()]
    }

    pub fn effective_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn maturity_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Index of the first boundary falling on or after `date`
    pub fn first_boundary_on_or_after(&self, date: NaiveDate) -> Option<usize> {
        self.dates.iter().position(|d| *d >= date)
    }

    /// Period labels (period start dates, `YYYY-MM-DD`)
    pub fn labels(&self) -> Vec<String> {
        self.period_starts()
            .iter()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect()
    }
}

/// Add calendar months, clamping to the last day of shorter months
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or(BreakFundingError::DateOverflow { date, months })
}

/// Build the boundary dates from `effective_date` to `maturity_date`
///
/// Steps one period at a time from the previous boundary (so month-end clamping
/// carries forward) while the next date is strictly before maturity, then
/// appends maturity. The last period may be a short stub.
pub fn build_schedule(
    effective_date: NaiveDate,
    maturity_date: NaiveDate,
    frequency: Frequency,
) -> Result<PaymentSchedule> {
    if effective_date >= maturity_date {
        return Err(BreakFundingError::InvalidTerms(format!(
            "effective date {} must be before maturity date {}",
            effective_date, maturity_date
        )));
    }

    let months = frequency.months_per_period();
    let mut dates = Vec::new();
    let mut current = effective_date;

    while current < maturity_date {
        dates.push(current);
        current = add_months(current, months)?;
    }
    dates.push(maturity_date);

    log::debug!(
        "Built {} schedule {} -> {} with {} periods",
        frequency,
        effective_date,
        maturity_date,
        dates.len() - 1
    );

    Ok(PaymentSchedule { frequency, dates })
}
