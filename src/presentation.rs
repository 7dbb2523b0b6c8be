//! Chart data for the external renderer
//!
//! Four stacked series per period: prepaid interest, prepaid principal,
//! remaining interest and remaining principal.

use serde::Serialize;
use std::io::Write;

use crate::amortization::{AdjustedCashflow, CashflowVector};
use crate::break_funding::BreakFundingResult;
use crate::error::Result;
use crate::schedule::PaymentSchedule;

/// Stacked chart series aligned to the schedule's period labels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedSeries {
    pub labels: Vec<String>,

    /// Always zero: interest is not recomputed after prepayment
    pub prepaid_interest: Vec<f64>,
    pub prepaid_principal: Vec<f64>,
    pub remaining_interest: Vec<f64>,
    pub remaining_principal: Vec<f64>,
}

/// One CSV row of chart data
#[derive(Debug, Serialize)]
struct ChartRow<'a> {
    period: usize,
    label: &'a str,
    prepaid_interest: f64,
    prepaid_principal: f64,
    remaining_interest: f64,
    remaining_principal: f64,
}

impl StackedSeries {
    pub fn build(schedule: &PaymentSchedule, original: &CashflowVector, adjusted: &AdjustedCashflow) -> Self {
        let prepaid_principal = original
            .principal
            .iter()
            .zip(adjusted.principal())
            .map(|(o, a)| o - a)
            .collect();

        Self {
            labels: schedule.labels(),
            prepaid_interest: vec![0.0; original.periods()],
            prepaid_principal,
            remaining_interest: adjusted.interest().to_vec(),
            remaining_principal: adjusted.principal().to_vec(),
        }
    }

    pub fn from_result(result: &BreakFundingResult) -> Self {
        Self::build(&result.schedule, &result.original, &result.adjusted)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Height of each stacked bar
    pub fn totals(&self) -> Vec<f64> {
        (0..self.len())
            .map(|i| {
                self.prepaid_interest[i]
                    + self.prepaid_principal[i]
                    + self.remaining_interest[i]
                    + self.remaining_principal[i]
            })
            .collect()
    }

    /// Write one row per period with a header
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for (i, label) in self.labels.iter().enumerate() {
            csv_writer.serialize(ChartRow {
                period: i + 1,
                label,
                prepaid_interest: self.prepaid_interest[i],
                prepaid_principal: self.prepaid_principal[i],
                remaining_interest: self.remaining_interest[i],
                remaining_principal: self.remaining_principal[i],
            })?;
        }
        csv_writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}
