//! Error taxonomy for break-funding computations
//!
//! Every failure aborts the whole computation; there is no partial result.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while scheduling, amortizing, prepaying or discounting a loan
#[derive(Debug, Error)]
pub enum BreakFundingError {
    /// Frequency string does not map to a known period length
    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),

    /// Amortization method string is not recognized
    #[error("Unknown amortization type: {0}")]
    UnknownAmortizationType(String),

    /// Recognized but unsupported feature
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    /// No schedule boundary falls on or after the prepayment date
    #[error("Prepayment date {prepayment_date} is beyond loan maturity {maturity_date}")]
    PrepaymentBeyondMaturity {
        prepayment_date: NaiveDate,
        maturity_date: NaiveDate,
    },

    /// Prepayment is larger than the principal still outstanding at the prepayment period
    #[error("Prepayment amount {amount:.2} exceeds remaining balance {remaining:.2}")]
    PrepaymentExceedsBalance { amount: f64, remaining: f64 },

    /// Non-numeric input for a rate or amount field
    #[error("Could not parse {field} as a number: {value:?}")]
    NumericParseError { field: &'static str, value: String },

    /// Unparseable calendar date
    #[error("Could not parse {field} as a date: {value:?}")]
    InvalidDate { field: &'static str, value: String },

    /// Loan terms that are individually well-formed but inconsistent
    #[error("Invalid loan terms: {0}")]
    InvalidTerms(String),

    /// A schedule with fewer than two boundaries has no periods to amortize
    #[error("Payment schedule has no periods")]
    EmptySchedule,

    /// Month arithmetic ran off the end of the supported calendar
    #[error("Date arithmetic overflow adding {months} months to {date}")]
    DateOverflow { date: NaiveDate, months: u32 },

    /// Failure reported by an external collaborator (extraction, chat)
    #[error("Service error: {0}")]
    Service(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, BreakFundingError>;
