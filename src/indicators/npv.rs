//! Net present value over the borrower's cash-flow series

use crate::loan::Periodicity;
use crate::rates::{periodic_effective_rate, round10};
use crate::schedule::PeriodFlow;

/// Borrower-perspective cash flows: the net disbursement as a period-0
/// inflow, then each period's total payment as an outflow.
pub fn cash_flows(
    flows: &[PeriodFlow],
    financed_capital: f64,
    initial_commission: f64,
) -> Vec<f64> {
    let mut series = Vec::with_capacity(flows.len() + 1);
    series.push(financed_capital - initial_commission);
    series.extend(flows.iter().map(|f| -f.total_payment));
    series
}

/// NPV of a cash-flow series at a periodic rate.
///
/// Each discounted term is rounded back to the fixed rate precision, so
/// the sum is reproducible bit-for-bit across runs.
pub fn npv_at_periodic_rate(series: &[f64], periodic_rate: f64) -> f64 {
    series
        .iter()
        .enumerate()
        .map(|(k, &cf)| {
            if k == 0 {
                cf
            } else {
                round10(cf / (1.0 + periodic_rate).powi(k as i32))
            }
        })
        .sum()
}

/// NPV at an annual effective discount rate, converted to the schedule's
/// payment-period rate with the standard geometric conversion.
pub fn npv_at_annual_rate(series: &[f64], annual_rate: f64, frequency: Periodicity) -> f64 {
    let periodic = periodic_effective_rate(annual_rate, frequency);
    npv_at_periodic_rate(series, periodic)
}
