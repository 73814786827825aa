//! Credit simulator CLI
//!
//! Runs a single loan simulation from command-line flags and prints the
//! schedule head, the full schedule as CSV and the indicator summary.

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::Parser;
use credit_engine::{
    Currency, GraceKind, LoanTerms, Periodicity, RateType, SimulationRunner,
};
use std::fs::File;
use std::io::Write;

#[derive(Parser, Debug)]
#[command(name = "credit_engine", about = "Installment credit simulator")]
struct Args {
    /// Loan label used in the output
    #[arg(long, default_value = "simulated-loan")]
    name: String,

    /// Currency tag: PEN or USD (display only)
    #[arg(long, default_value = "PEN")]
    currency: String,

    /// Requested loan amount
    #[arg(long, default_value_t = 100_000.0)]
    principal: f64,

    /// Upfront subsidy deducted from the principal
    #[arg(long, default_value_t = 20_000.0)]
    bonus: f64,

    /// Upfront initial fee deducted from the principal
    #[arg(long, default_value_t = 10_000.0)]
    initial_fee: f64,

    /// Annual rate as a decimal (0.08 = 8%)
    #[arg(long, default_value_t = 0.08)]
    rate: f64,

    /// NOMINAL or EFFECTIVE
    #[arg(long, default_value = "EFFECTIVE")]
    rate_type: String,

    /// Capitalization period for nominal rates:
    /// MONTHLY, QUARTERLY, SEMI_ANNUAL or ANNUAL
    #[arg(long, default_value = "ANNUAL")]
    capitalization: String,

    /// Payment frequency: MONTHLY, QUARTERLY, SEMI_ANNUAL or ANNUAL
    #[arg(long, default_value = "MONTHLY")]
    frequency: String,

    /// Term in payment periods
    #[arg(long, default_value_t = 240)]
    term: u32,

    /// Grace kind: NONE, PARTIAL or TOTAL
    #[arg(long, default_value = "NONE")]
    grace: String,

    /// Grace length in periods
    #[arg(long, default_value_t = 0)]
    grace_periods: u32,

    /// Per-period life insurance percentage (decimal)
    #[arg(long, default_value_t = 0.0005)]
    insurance_pct: f64,

    /// Fixed per-period property insurance
    #[arg(long, default_value_t = 25.0)]
    fixed_insurance: f64,

    /// One-off commission at disbursement
    #[arg(long, default_value_t = 0.0)]
    initial_commission: f64,

    /// Commission charged every period
    #[arg(long, default_value_t = 10.0)]
    periodic_commission: f64,

    /// One-off commission at the end of the term
    #[arg(long, default_value_t = 0.0)]
    final_commission: f64,

    /// Disbursement date (YYYY-MM-DD)
    #[arg(long, default_value = "2026-01-15")]
    disbursement: NaiveDate,

    /// Annual discount rate for NPV (effective)
    #[arg(long)]
    discount_rate: Option<f64>,

    /// PEN/USD exchange rate, echoed for display only
    #[arg(long)]
    exchange_rate: Option<f64>,

    /// Output CSV path for the full schedule
    #[arg(long, default_value = "schedule_output.csv")]
    csv_out: String,

    /// Print the indicator summary as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn parse_periodicity(value: &str) -> Result<Periodicity> {
    match value {
        "MONTHLY" => Ok(Periodicity::Monthly),
        "QUARTERLY" => Ok(Periodicity::Quarterly),
        "SEMI_ANNUAL" => Ok(Periodicity::SemiAnnual),
        "ANNUAL" => Ok(Periodicity::Annual),
        other => bail!("unknown periodicity: {}", other),
    }
}

fn terms_from_args(args: &Args) -> Result<LoanTerms> {
    let currency = match args.currency.as_str() {
        "PEN" => Currency::Pen,
        "USD" => Currency::Usd,
        other => bail!("unknown currency: {}", other),
    };
    let rate_type = match args.rate_type.as_str() {
        "NOMINAL" => RateType::Nominal,
        "EFFECTIVE" => RateType::Effective,
        other => bail!("unknown rate type: {}", other),
    };
    let grace_kind = match args.grace.as_str() {
        "NONE" => GraceKind::None,
        "PARTIAL" => GraceKind::Partial,
        "TOTAL" => GraceKind::Total,
        other => bail!("unknown grace kind: {}", other),
    };

    Ok(LoanTerms {
        name: args.name.clone(),
        currency,
        principal: args.principal,
        bonus_amount: args.bonus,
        initial_fee_amount: args.initial_fee,
        annual_rate: args.rate,
        rate_type,
        capitalization: parse_periodicity(&args.capitalization)?,
        payment_frequency: parse_periodicity(&args.frequency)?,
        term_periods: args.term,
        grace_kind,
        grace_periods: args.grace_periods,
        insurance_percentage: args.insurance_pct,
        fixed_insurance: args.fixed_insurance,
        initial_commission: args.initial_commission,
        periodic_commission: args.periodic_commission,
        final_commission: args.final_commission,
        disbursement_date: args.disbursement,
        discount_rate: args.discount_rate,
        exchange_rate: args.exchange_rate,
    })
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let terms = terms_from_args(&args)?;

    println!("Credit Engine v0.1.0");
    println!("====================\n");

    println!("Loan: {}", terms.name);
    println!("  Currency: {}", terms.currency.as_str());
    println!("  Principal: {:.2}", terms.principal);
    println!("  Financed capital: {:.2}", terms.financed_capital());
    println!("  Annual rate: {:.4} ({:?})", terms.annual_rate, terms.rate_type);
    println!("  Term: {} periods ({:?})", terms.term_periods, terms.payment_frequency);
    if terms.effective_grace_periods() > 0 {
        println!(
            "  Grace: {:?}, {} periods",
            terms.grace_kind,
            terms.effective_grace_periods()
        );
    }
    if let Some(fx) = terms.exchange_rate {
        println!("  Exchange rate (display only): {:.4}", fx);
    }
    println!();

    let runner = SimulationRunner::new();
    let result = runner.run(&terms)?;

    println!(
        "Schedule ({} periods, periodic rate {:.10}):",
        result.schedule.len(),
        result.schedule.periodic_rate
    );
    println!(
        "{:>6} {:>14} {:>12} {:>14} {:>12} {:>12} {:>12} {:>14}",
        "Period", "Kind", "Due", "Opening", "Interest", "Amort", "Payment", "Total"
    );
    println!("{}", "-".repeat(102));

    for flow in result.schedule.flows.iter().take(24) {
        println!(
            "{:>6} {:>14} {:>12} {:>14.2} {:>12.2} {:>12.2} {:>12.2} {:>14.2}",
            flow.period,
            flow.kind.as_str(),
            flow.due_date.to_string(),
            flow.opening_balance,
            flow.interest,
            flow.amortization,
            flow.base_payment,
            flow.total_payment,
        );
    }
    if result.schedule.len() > 24 {
        println!("... ({} more periods)", result.schedule.len() - 24);
    }

    // Write the full schedule to CSV
    let mut file = File::create(&args.csv_out)?;
    writeln!(
        file,
        "Period,Kind,DueDate,OpeningBalance,BasePayment,Interest,Amortization,Insurance,FixedInsurance,Commission,TotalPayment,ClosingBalance"
    )?;
    for flow in &result.schedule.flows {
        writeln!(
            file,
            "{},{},{},{:.8},{:.8},{:.8},{:.8},{:.8},{:.8},{:.8},{:.8},{:.8}",
            flow.period,
            flow.kind.as_str(),
            flow.due_date,
            flow.opening_balance,
            flow.base_payment,
            flow.interest,
            flow.amortization,
            flow.insurance,
            flow.fixed_insurance,
            flow.commission,
            flow.total_payment,
            flow.closing_balance,
        )?;
    }
    println!("\nFull schedule written to: {}", args.csv_out);

    let ind = &result.indicators;
    if args.json {
        println!("\n{}", serde_json::to_string_pretty(ind)?);
        return Ok(());
    }

    println!("\nIndicators:");
    if let Some(npv) = ind.npv {
        println!("  NPV: {:.2}", npv);
    }
    println!("  IRR (periodic): {:.6}", ind.irr_periodic);
    println!(
        "  Annualized cost rate: {:.4}%",
        ind.annualized_cost_rate * 100.0
    );
    if ind.low_confidence_irr {
        println!("  (low confidence: the rate search did not converge)");
    }
    println!("  Total base payments: {:.2}", ind.total_base_payments);
    println!("  Total interest: {:.2}", ind.total_interest);
    println!("  Total amortization: {:.2}", ind.total_amortization);
    println!("  Total costs: {:.2}", ind.total_costs);
    println!("  Total paid: {:.2}", ind.total_paid);
    println!("  Cost of credit: {:.2}", ind.cost_of_credit);
    println!("  Average payment: {:.2}", ind.average_payment);

    Ok(())
}
