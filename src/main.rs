//! Break Funding CLI
//!
//! Computes the break-funding cost of prepaying one fixed-rate loan

use anyhow::Context;
use break_funding::{
    config::CurveConfig, BreakFundingCalculator, FlatCurve, RawLoanTerms, StackedSeries,
};
use clap::Parser;
use std::fs::File;

#[derive(Debug, Parser)]
#[command(name = "break_funding", version, about = "Break-funding cost of a loan prepayment")]
struct Args {
    /// Loan effective date (YYYY-MM-DD or MM/DD/YYYY)
    #[arg(long)]
    effective_date: String,

    /// Loan maturity date
    #[arg(long)]
    maturity_date: String,

    /// monthly, quarterly, semiannual or annual
    #[arg(long, default_value = "quarterly")]
    frequency: String,

    /// interest_only, equal, linear or custom
    #[arg(long, default_value = "equal")]
    amortization: String,

    /// Annual loan rate in percent (3.40 = 3.40%)
    #[arg(long)]
    rate: String,

    /// Original principal
    #[arg(long)]
    balance: String,

    /// Prepayment date
    #[arg(long)]
    prepayment_date: String,

    /// Prepayment amount
    #[arg(long, default_value = "0")]
    prepayment_amount: String,

    /// Discount at a flat annual rate (decimal) instead of the synthetic curve
    #[arg(long)]
    flat_rate: Option<f64>,

    /// Write the stacked chart series to this CSV file
    #[arg(long)]
    chart_csv: Option<String>,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let raw = RawLoanTerms {
        effective_date: args.effective_date,
        maturity_date: args.maturity_date,
        frequency: args.frequency,
        amortization_type: args.amortization,
        loan_rate: args.rate,
        balance: args.balance,
        prepayment_date: args.prepayment_date,
        prepayment_amount: args.prepayment_amount,
    };
    let terms = raw.parse().context("Invalid loan terms")?;

    let calculator = match args.flat_rate {
        Some(rate) => BreakFundingCalculator::new(FlatCurve::new(rate)),
        None => BreakFundingCalculator::from_config(&CurveConfig::from_env()),
    };

    let result = calculator
        .calculate(&terms)
        .context("Break-funding computation failed")?;

    if let Some(path) = &args.chart_csv {
        let file = File::create(path).with_context(|| format!("Unable to create {}", path))?;
        StackedSeries::from_result(&result)
            .write_csv(file)
            .with_context(|| format!("Unable to write chart data to {}", path))?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("Break Funding v0.1.0");
    println!("====================\n");
    println!("Loan: {} -> {}, {} {}", terms.effective_date, terms.maturity_date, terms.frequency, terms.amortization_type);
    println!("  Balance:    ${:.2}", terms.balance);
    println!("  Rate:       {:.4}% ({:.6} per period)", terms.annual_rate, terms.period_rate());
    println!("  Prepayment: ${:.2} on {}", terms.prepayment_amount, terms.prepayment_date);
    println!("  Curve:      {}", result.curve);
    println!();

    println!(
        "{:>4} {:>12} {:>16} {:>14} {:>16} {:>10}",
        "Per", "Start", "Principal", "Interest", "Adj Principal", "DF"
    );
    println!("{}", "-".repeat(78));

    let labels = result.schedule.labels();
    for i in 0..result.original.periods() {
        println!(
            "{:>4} {:>12} {:>16.2} {:>14.2} {:>16.2} {:>10.6}",
            i + 1,
            labels[i],
            result.original.principal[i],
            result.original.interest[i],
            result.adjusted.principal()[i],
            result.discount_factors[i],
        );
    }

    let summary = result.original.summary();
    println!("\nSummary:");
    println!("  Periods:          {}", summary.periods);
    println!("  Total Principal:  ${:.2}", summary.total_principal);
    println!("  Total Interest:   ${:.2}", summary.total_interest);
    println!("  PV Original:      ${:.2}", result.pv_original);
    println!("  PV Adjusted:      ${:.2}", result.pv_adjusted);

    println!("\n========================================");
    println!("  BREAK-FUNDING COST: ${:.2}", result.cost);
    println!("========================================");

    if let Some(path) = &args.chart_csv {
        println!("\nChart data written to: {}", path);
    }

    Ok(())
}
