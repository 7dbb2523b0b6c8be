//! Cashflow vectors produced by the amortization engine and prepayment adjuster

use serde::{Deserialize, Serialize};

/// Round a currency amount to cents
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Per-period principal and interest, one entry per schedule period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowVector {
    pub principal: Vec<f64>,
    pub interest: Vec<f64>,
}

impl CashflowVector {
    pub fn with_capacity(periods: usize) -> Self {
        Self {
            principal: Vec::with_capacity(periods),
            interest: Vec::with_capacity(periods),
        }
    }

    /// Append one period, rounding both legs to cents
    pub fn push(&mut self, principal: f64, interest: f64) {
        self.principal.push(round_to_cents(principal));
        self.interest.push(round_to_cents(interest));
    }

    pub fn periods(&self) -> usize {
        self.principal.len()
    }

    /// Principal plus interest for every period
    pub fn total_payments(&self) -> Vec<f64> {
        self.principal
            .iter()
            .zip(&self.interest)
            .map(|(p, i)| p + i)
            .collect()
    }

    /// Principal still to be paid from period `index` onward
    pub fn remaining_principal_from(&self, index: usize) -> f64 {
        self.principal.iter().skip(index).sum()
    }

    pub fn summary(&self) -> CashflowSummary {
        let total_principal: f64 = self.principal.iter().sum();
        let total_interest: f64 = self.interest.iter().sum();

        CashflowSummary {
            periods: self.periods(),
            total_principal,
            total_interest,
            total_payments: total_principal + total_interest,
            final_principal: self.principal.last().copied().unwrap_or(0.0),
        }
    }
}

/// Principal track after a prepayment
///
/// The interest leg is carried over from the original schedule unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustedCashflow {
    /// First schedule boundary on or after the prepayment date
    pub prepay_index: usize,

    /// Amount applied against the principal track
    pub prepayment_amount: f64,

    pub cashflows: CashflowVector,
}

impl AdjustedCashflow {
    pub fn principal(&self) -> &[f64] {
        &self.cashflows.principal
    }

    pub fn interest(&self) -> &[f64] {
        &self.cashflows.interest
    }
}

/// Totals for a cashflow vector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashflowSummary {
    pub periods: usize,
    pub total_principal: f64,
    pub total_interest: f64,
    pub total_payments: f64,
    pub final_principal: f64,
}
