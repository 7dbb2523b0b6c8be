//! Loan term data structures and boundary parsing

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{BreakFundingError, Result};

/// Payment frequency of the loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Monthly,
    Quarterly,
    Semiannual,
    Annual,
}

impl Frequency {
    /// Length of one payment period in months
    pub fn months_per_period(&self) -> u32 {
        match self {
            Frequency::Monthly => 1,
            Frequency::Quarterly => 3,
            Frequency::Semiannual => 6,
            Frequency::Annual => 12,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Semiannual => "semiannual",
            Frequency::Annual => "annual",
        }
    }
}

impl FromStr for Frequency {
    type Err = BreakFundingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "monthly" => Ok(Frequency::Monthly),
            "quarterly" => Ok(Frequency::Quarterly),
            "semiannual" => Ok(Frequency::Semiannual),
            "annual" => Ok(Frequency::Annual),
            _ => Err(BreakFundingError::InvalidFrequency(s.to_string())),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Principal repayment regime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmortizationType {
    /// Interest every period, full principal at maturity
    InterestOnly,
    /// Level payment (annuity)
    Equal,
    /// Constant principal per period
    Linear,
    /// User-defined schedule (recognized, never computed)
    Custom,
}

impl AmortizationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmortizationType::InterestOnly => "interest_only",
            AmortizationType::Equal => "equal",
            AmortizationType::Linear => "linear",
            AmortizationType::Custom => "custom",
        }
    }
}

impl FromStr for AmortizationType {
    type Err = BreakFundingError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "interest_only" => Ok(AmortizationType::InterestOnly),
            "equal" => Ok(AmortizationType::Equal),
            "linear" => Ok(AmortizationType::Linear),
            "custom" => Ok(AmortizationType::Custom),
            _ => Err(BreakFundingError::UnknownAmortizationType(s.to_string())),
        }
    }
}

impl fmt::Display for AmortizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated loan terms for a single computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub effective_date: NaiveDate,
    pub maturity_date: NaiveDate,
    pub frequency: Frequency,
    pub amortization_type: AmortizationType,

    /// Annual rate in percent (3.40 means 3.40% per year)
    pub annual_rate: f64,

    /// Original principal
    pub balance: f64,

    pub prepayment_date: NaiveDate,
    pub prepayment_amount: f64,
}

impl LoanTerms {
    /// Interest rate applicable to one payment period
    pub fn period_rate(&self) -> f64 {
        self.annual_rate / 100.0 * self.frequency.months_per_period() as f64 / 12.0
    }

    /// Check cross-field consistency
    ///
    /// A prepayment date past maturity is left for the prepayment adjuster to reject.
    pub fn validate(&self) -> Result<()> {
        if self.effective_date >= self.maturity_date {
            return Err(BreakFundingError::InvalidTerms(format!(
                "effective date {} must be before maturity date {}",
                self.effective_date, self.maturity_date
            )));
        }
        if !self.balance.is_finite() || self.balance <= 0.0 {
            return Err(BreakFundingError::InvalidTerms(format!(
                "balance must be positive, got {}",
                self.balance
            )));
        }
        if !self.annual_rate.is_finite() {
            return Err(BreakFundingError::InvalidTerms(format!(
                "annual rate must be finite, got {}",
                self.annual_rate
            )));
        }
        if !self.prepayment_amount.is_finite() || self.prepayment_amount < 0.0 {
            return Err(BreakFundingError::InvalidTerms(format!(
                "prepayment amount must be non-negative, got {}",
                self.prepayment_amount
            )));
        }
        if self.prepayment_date < self.effective_date {
            return Err(BreakFundingError::InvalidTerms(format!(
                "prepayment date {} precedes effective date {}",
                self.prepayment_date, self.effective_date
            )));
        }
        Ok(())
    }
}

/// Loan terms as delivered by a form, a CSV row or the extraction service
///
/// All fields are raw strings; `parse` turns them into validated `LoanTerms`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLoanTerms {
    pub effective_date: String,
    pub maturity_date: String,
    pub frequency: String,
    pub amortization_type: String,
    pub loan_rate: String,
    pub balance: String,
    #[serde(default)]
    pub prepayment_date: String,
    #[serde(default)]
    pub prepayment_amount: String,
}

impl RawLoanTerms {
    /// Parse every field and validate the result
    ///
    /// Enumerations are checked first so malformed frequency or method strings
    /// fail before any numeric work.
    pub fn parse(&self) -> Result<LoanTerms> {
        let frequency: Frequency = self.frequency.parse()?;
        let amortization_type: AmortizationType = self.amortization_type.parse()?;

        let terms = LoanTerms {
            effective_date: parse_date("effective_date", &self.effective_date)?,
            maturity_date: parse_date("maturity_date", &self.maturity_date)?,
            frequency,
            amortization_type,
            annual_rate: parse_number("loan_rate", &self.loan_rate)?,
            balance: parse_number("balance", &self.balance)?,
            prepayment_date: parse_date("prepayment_date", &self.prepayment_date)?,
            prepayment_amount: parse_number("prepayment_amount", &self.prepayment_amount)?,
        };
        terms.validate()?;
        Ok(terms)
    }
}

/// Accepted input date layouts: ISO first, then the US layout the extraction model emits
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a calendar date in `YYYY-MM-DD` or `MM/DD/YYYY` form
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| BreakFundingError::InvalidDate {
            field,
            value: value.to_string(),
        })
}

/// Parse a decimal amount or percentage
///
/// Tolerates surrounding whitespace, a leading `$`, thousands separators and a trailing `%`.
pub fn parse_number(field: &'static str, value: &str) -> Result<f64> {
    let cleaned: String = value
        .trim()
        .trim_start_matches('$')
        .trim_end_matches('%')
        .chars()
        .filter(|c| *c != ',')
        .collect();

    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| BreakFundingError::NumericParseError {
            field,
            value: value.to_string(),
        })
}
