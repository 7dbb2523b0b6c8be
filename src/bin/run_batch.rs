//! Break-funding cost for a whole loan book
//!
//! Reads a CSV of loans, computes every loan in parallel and prints a summary.
//! Supports JSON output for API integration via --json.
//! Curve parameters come from BREAK_FUNDING_CURVE_BASE_RATE / BREAK_FUNDING_CURVE_STEP.

use anyhow::Context;
use break_funding::batch::{BatchRunner, BatchSummary};
use break_funding::config::CurveConfig;
use break_funding::loan::load_loans;
use clap::Parser;
use serde::Serialize;
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(name = "run_batch", about = "Break-funding cost for every loan in a CSV book")]
struct Args {
    /// Loan book CSV
    #[arg(default_value = "data/sample_loans.csv")]
    path: String,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct BatchResponse<'a> {
    summary: BatchSummary,
    loans: &'a [break_funding::batch::BatchOutcome],
    execution_time_ms: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let start = Instant::now();

    let records = load_loans(&args.path).with_context(|| format!("Failed to load loans from {}", args.path))?;
    if !args.json {
        println!("Loaded {} loans from {} in {:?}", records.len(), args.path, start.elapsed());
    }

    let config = CurveConfig::from_env();
    let runner = BatchRunner::from_config(&config);
    let outcomes = runner.run(&records);
    let summary = BatchSummary::from_outcomes(&outcomes);

    if args.json {
        let response = BatchResponse {
            summary,
            loans: &outcomes,
            execution_time_ms: start.elapsed().as_millis() as u64,
        };
        println!("{}", serde_json::to_string(&response)?);
        return Ok(());
    }

    println!("Curve: {}\n", runner.calculator().curve().describe());
    println!("{:<12} {:>8} {:>18} {:>18} {:>14}", "Loan", "Periods", "PV Original", "PV Adjusted", "Cost");
    println!("{}", "-".repeat(74));

    for outcome in &outcomes {
        match (&outcome.error, outcome.periods, outcome.pv_original, outcome.pv_adjusted, outcome.cost) {
            (None, Some(periods), Some(pv_orig), Some(pv_adj), Some(cost)) => {
                println!("{:<12} {:>8} {:>18.2} {:>18.2} {:>14.2}", outcome.loan_id, periods, pv_orig, pv_adj, cost);
            }
            (error, ..) => {
                println!("{:<12} ERROR: {}", outcome.loan_id, error.as_deref().unwrap_or("unknown"));
            }
        }
    }

    println!("\n========================================");
    println!("  Loans:      {} ({} ok, {} failed)", summary.loan_count, summary.succeeded, summary.failed);
    println!("  TOTAL COST: ${:.2}", summary.total_cost);
    println!("========================================");
    println!("\nTotal time: {:?}", start.elapsed());

    Ok(())
}
