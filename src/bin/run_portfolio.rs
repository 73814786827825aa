//! Run schedules and indicators for an entire loan-portfolio CSV
//!
//! Loans are independent, so the batch fans out across cores with rayon.

use credit_engine::loan::load_loans;
use credit_engine::SimulationRunner;
use rayon::prelude::*;
use std::fs::File;
use std::io::Write;
use std::time::Instant;

fn main() {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "loan_portfolio.csv".to_string());

    let start = Instant::now();
    println!("Loading loans from {}...", path);

    let loans = load_loans(&path).expect("Failed to load loan portfolio");
    println!("Loaded {} loans in {:?}", loans.len(), start.elapsed());

    let runner = SimulationRunner::new();

    println!("Running simulations...");
    let sim_start = Instant::now();

    let results: Vec<_> = loans
        .par_iter()
        .map(|terms| (terms.name.clone(), runner.run(terms)))
        .collect();

    println!(
        "Simulated {} loans in {:?}",
        results.len(),
        sim_start.elapsed()
    );

    let csv_path = "portfolio_summary.csv";
    let mut file = File::create(csv_path).expect("Unable to create summary CSV");
    writeln!(
        file,
        "Name,Currency,FinancedCapital,Periods,PeriodicRate,AnnualizedCostRate,NPV,TotalPaid,CostOfCredit,LowConfidenceIrr"
    )
    .unwrap();

    let mut failures = 0usize;
    let mut total_paid_sum = 0.0;
    let mut low_confidence = 0usize;

    for (name, result) in &results {
        match result {
            Ok(sim) => {
                total_paid_sum += sim.indicators.total_paid;
                if sim.indicators.low_confidence_irr {
                    low_confidence += 1;
                }
                writeln!(
                    file,
                    "{},{},{:.2},{},{:.10},{:.6},{},{:.2},{:.2},{}",
                    name,
                    sim.terms.currency.as_str(),
                    sim.schedule.financed_capital,
                    sim.schedule.len(),
                    sim.schedule.periodic_rate,
                    sim.indicators.annualized_cost_rate,
                    sim.indicators
                        .npv
                        .map(|v| format!("{:.2}", v))
                        .unwrap_or_default(),
                    sim.indicators.total_paid,
                    sim.indicators.cost_of_credit,
                    sim.indicators.low_confidence_irr,
                )
                .unwrap();
            }
            Err(err) => {
                failures += 1;
                eprintln!("  {} failed: {}", name, err);
            }
        }
    }

    println!("\nSummary:");
    println!("  Simulated OK: {}", results.len() - failures);
    println!("  Failed: {}", failures);
    println!("  Low-confidence IRR: {}", low_confidence);
    println!("  Total paid across portfolio: {:.2}", total_paid_sum);
    println!("\nPer-loan results written to: {}", csv_path);
}
