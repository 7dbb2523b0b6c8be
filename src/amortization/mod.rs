//! Amortization engine and prepayment adjuster

mod cashflows;
mod engine;
mod prepayment;

pub use cashflows::{round_to_cents, AdjustedCashflow, CashflowSummary, CashflowVector};
pub use engine::{amortize, amortize_terms, level_payment};
pub use prepayment::{apply_prepayment, ROUNDING_TOLERANCE_PER_PERIOD};
