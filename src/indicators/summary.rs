//! Indicator summary: totals, NPV, IRR and the annualized cost rate

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::loan::Periodicity;
use crate::rates::annualize;
use crate::schedule::{PeriodFlow, BALANCE_TOLERANCE};

use super::irr::bisect_irr;
use super::npv::{cash_flows, npv_at_annual_rate};

/// Financial transparency indicators for one completed schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSummary {
    /// NPV at the caller's discount rate; absent without a positive rate
    pub npv: Option<f64>,

    /// Periodic internal rate of return
    pub irr_periodic: f64,

    /// IRR expressed as an annual effective rate (TCEA-style)
    pub annualized_cost_rate: f64,

    /// Set when the IRR search never reached its NPV precision; the
    /// rate is the last bisection midpoint and should be shown as
    /// indicative only
    pub low_confidence_irr: bool,

    /// Sum of base payments over amortizing periods
    pub total_base_payments: f64,

    /// Sum of interest over amortizing periods
    pub total_interest: f64,

    /// Sum of principal repaid over amortizing periods
    pub total_amortization: f64,

    /// Life insurance over every period, grace included
    pub total_insurance: f64,

    /// Fixed insurance over every period, grace included
    pub total_fixed_insurance: f64,

    /// Periodic commissions over every period, grace included
    pub total_commissions: f64,

    /// All non-interest charges: insurance, fixed insurance, periodic
    /// plus initial and final commissions
    pub total_costs: f64,

    /// Total base payments plus total costs
    pub total_paid: f64,

    /// Total interest plus total costs
    pub cost_of_credit: f64,

    /// Total paid averaged over the term
    pub average_payment: f64,

    /// Signed difference between total amortization and the financed
    /// capital; beyond [`BALANCE_TOLERANCE`] it is logged as a warning
    pub amortization_variance: f64,
}

/// Derive the indicator summary from a complete, reconciled schedule.
///
/// Must only be called once the whole schedule exists: NPV and IRR
/// discount the full cash-flow series and make no sense on a prefix.
pub fn compute_indicators(
    flows: &[PeriodFlow],
    financed_capital: f64,
    initial_commission: f64,
    final_commission: f64,
    payment_frequency: Periodicity,
    discount_rate: Option<f64>,
) -> Result<IndicatorSummary, EngineError> {
    if flows.is_empty() {
        return Err(EngineError::EmptySchedule);
    }

    let mut total_base_payments = 0.0;
    let mut total_interest = 0.0;
    let mut total_amortization = 0.0;
    let mut total_insurance = 0.0;
    let mut total_fixed_insurance = 0.0;
    let mut total_commissions = 0.0;

    for flow in flows {
        if flow.kind.is_amortization() {
            total_base_payments += flow.base_payment;
            total_interest += flow.interest;
            total_amortization += flow.amortization;
        }
        total_insurance += flow.insurance;
        total_fixed_insurance += flow.fixed_insurance;
        total_commissions += flow.commission;
    }

    let total_costs = total_insurance
        + total_fixed_insurance
        + total_commissions
        + initial_commission
        + final_commission;
    let total_paid = total_base_payments + total_costs;
    let cost_of_credit = total_interest + total_costs;
    let average_payment = total_paid / flows.len() as f64;

    let amortization_variance = total_amortization - financed_capital;
    if amortization_variance.abs() > BALANCE_TOLERANCE {
        warn!(
            "amortization total deviates from financed capital by {:.6}",
            amortization_variance
        );
    }

    let series = cash_flows(flows, financed_capital, initial_commission);

    let irr = bisect_irr(&series);
    if !irr.converged {
        warn!(
            "IRR bisection did not reach its NPV precision; reporting last midpoint {:.10} as low confidence",
            irr.periodic_rate
        );
    }
    let annualized_cost_rate =
        annualize(irr.periodic_rate, payment_frequency.periods_per_year());

    let npv = discount_rate
        .filter(|rate| *rate > 0.0)
        .map(|rate| npv_at_annual_rate(&series, rate, payment_frequency));

    Ok(IndicatorSummary {
        npv,
        irr_periodic: irr.periodic_rate,
        annualized_cost_rate,
        low_confidence_irr: !irr.converged,
        total_base_payments,
        total_interest,
        total_amortization,
        total_insurance,
        total_fixed_insurance,
        total_commissions,
        total_costs,
        total_paid,
        cost_of_credit,
        average_payment,
        amortization_variance,
    })
}
