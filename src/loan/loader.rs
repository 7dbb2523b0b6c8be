//! Load loan terms from a CSV book of loans

use super::RawLoanTerms;
use crate::error::Result;
use csv::Reader;
use std::path::Path;

/// Raw CSV row matching the loan book columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    loan_id: String,
    effective_date: String,
    maturity_date: String,
    frequency: String,
    amortization_type: String,
    loan_rate: String,
    balance: String,
    #[serde(default)]
    prepayment_date: String,
    #[serde(default)]
    prepayment_amount: String,
}

/// A loan book entry; parsing is deferred so one bad row does not sink the book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanRecord {
    pub loan_id: String,
    pub terms: RawLoanTerms,
}

impl CsvRow {
    fn into_record(self) -> LoanRecord {
        LoanRecord {
            loan_id: self.loan_id.trim().to_string(),
            terms: RawLoanTerms {
                effective_date: self.effective_date,
                maturity_date: self.maturity_date,
                frequency: self.frequency,
                amortization_type: self.amortization_type,
                loan_rate: self.loan_rate,
                balance: self.balance,
                prepayment_date: self.prepayment_date,
                prepayment_amount: self.prepayment_amount,
            },
        }
    }
}

/// Load all loans from a CSV file
pub fn load_loans<P: AsRef<Path>>(path: P) -> Result<Vec<LoanRecord>> {
    let reader = Reader::from_path(path)?;
    collect_records(reader)
}

/// Load loans from any reader (e.g., string buffer, request body)
pub fn load_loans_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<LoanRecord>> {
    collect_records(Reader::from_reader(reader))
}

fn collect_records<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<LoanRecord>> {
    let mut loans = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        loans.push(row.into_record());
    }

    log::debug!("Loaded {} loan records", loans.len());
    Ok(loans)
}
