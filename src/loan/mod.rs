//! Loan terms and loan book loading

mod data;
pub mod loader;

pub use data::{parse_date, parse_number, AmortizationType, Frequency, LoanTerms, RawLoanTerms};
pub use loader::{load_loans, load_loans_from_reader, LoanRecord};
