//! Break Funding - prepayment impact engine for fixed-rate amortizing loans
//!
//! This library provides:
//! - Payment schedule generation at monthly, quarterly, semiannual or annual frequency
//! - Interest-only, level-payment and constant-principal amortization
//! - Backloaded application of a lump prepayment to the principal track
//! - Present-value break-funding cost against a pluggable discount curve
//! - Chart series export and injected extraction / Q&A collaborators

pub mod error;
pub mod loan;
pub mod schedule;
pub mod amortization;
pub mod discount;
pub mod break_funding;
pub mod presentation;
pub mod services;
pub mod config;
pub mod batch;

// Re-export commonly used types
pub use error::{BreakFundingError, Result};
pub use loan::{AmortizationType, Frequency, LoanTerms, RawLoanTerms};
pub use schedule::{build_schedule, PaymentSchedule};
pub use amortization::{amortize, apply_prepayment, AdjustedCashflow, CashflowVector};
pub use discount::{DiscountCurve, FlatCurve, SyntheticSofrCurve};
pub use break_funding::{compute_break_funding_cost, BreakFundingCalculator, BreakFundingResult};
pub use presentation::StackedSeries;
pub use batch::BatchRunner;
