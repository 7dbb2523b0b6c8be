//! Batch runner for break-funding over a book of loans
//!
//! Each loan is computed independently and in parallel. One loan failing
//! never affects the others.

use rayon::prelude::*;
use serde::Serialize;

use crate::break_funding::{BreakFundingCalculator, BreakFundingResult};
use crate::config::CurveConfig;
use crate::error::Result;
use crate::loan::LoanRecord;

/// Outcome for a single loan in a batch
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub loan_id: String,
    pub periods: Option<usize>,
    pub pv_original: Option<f64>,
    pub pv_adjusted: Option<f64>,
    pub cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchOutcome {
    fn from_result(loan_id: &str, result: Result<BreakFundingResult>) -> Self {
        match result {
            Ok(r) => Self {
                loan_id: loan_id.to_string(),
                periods: Some(r.original.periods()),
                pv_original: Some(r.pv_original),
                pv_adjusted: Some(r.pv_adjusted),
                cost: Some(r.cost),
                error: None,
            },
            Err(e) => Self {
                loan_id: loan_id.to_string(),
                periods: None,
                pv_original: None,
                pv_adjusted: None,
                cost: None,
                error: Some(e.to_string()),
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Totals across a batch
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub loan_count: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_cost: f64,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[BatchOutcome]) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.is_ok()).count();
        Self {
            loan_count: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
            total_cost: outcomes.iter().filter_map(|o| o.cost).sum(),
        }
    }
}

/// Shared calculator applied to many loans
pub struct BatchRunner {
    calculator: BreakFundingCalculator,
}

impl BatchRunner {
    pub fn new(calculator: BreakFundingCalculator) -> Self {
        Self { calculator }
    }

    pub fn from_config(config: &CurveConfig) -> Self {
        Self::new(BreakFundingCalculator::from_config(config))
    }

    /// Compute every loan in parallel; output order matches input order
    pub fn run(&self, records: &[LoanRecord]) -> Vec<BatchOutcome> {
        records
            .par_iter()
            .map(|record| {
                let result = record
                    .terms
                    .parse()
                    .and_then(|terms| self.calculator.calculate(&terms));
                if let Err(ref e) = result {
                    log::warn!("Loan {} failed: {}", record.loan_id, e);
                }
                BatchOutcome::from_result(&record.loan_id, result)
            })
            .collect()
    }

    pub fn calculator(&self) -> &BreakFundingCalculator {
        &self.calculator
    }
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new(BreakFundingCalculator::default())
    }
}
