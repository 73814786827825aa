//! Simulation runner for single loans and batches
//!
//! Pairs schedule generation with indicator calculation in the required
//! order: the indicator pass only ever sees a complete, reconciled
//! schedule. Loans are independent, so batches parallelize trivially in
//! the caller (the portfolio binary does exactly that with rayon).

use crate::error::EngineError;
use crate::indicators::{compute_indicators, IndicatorSummary};
use crate::loan::LoanTerms;
use crate::schedule::{generate_schedule, Schedule};

/// Schedule plus indicators for one simulated loan
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub terms: LoanTerms,
    pub schedule: Schedule,
    pub indicators: IndicatorSummary,
}

/// Runs complete simulations over loan terms
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulationRunner;

impl SimulationRunner {
    pub fn new() -> Self {
        Self
    }

    /// Simulate a single loan end to end
    pub fn run(&self, terms: &LoanTerms) -> Result<SimulationResult, EngineError> {
        let schedule = generate_schedule(terms)?;
        let indicators = compute_indicators(
            &schedule.flows,
            schedule.financed_capital,
            terms.initial_commission,
            terms.final_commission,
            terms.payment_frequency,
            terms.discount_rate,
        )?;

        Ok(SimulationResult {
            terms: terms.clone(),
            schedule,
            indicators,
        })
    }

    /// Simulate every loan in a batch; one loan failing validation does
    /// not affect the others
    pub fn run_batch(&self, loans: &[LoanTerms]) -> Vec<Result<SimulationResult, EngineError>> {
        loans.iter().map(|terms| self.run(terms)).collect()
    }

    /// Simulate rate variants of one loan (sensitivity runs)
    pub fn run_rate_variants(
        &self,
        terms: &LoanTerms,
        annual_rates: &[f64],
    ) -> Vec<Result<SimulationResult, EngineError>> {
        annual_rates
            .iter()
            .map(|&rate| {
                let mut variant = terms.clone();
                variant.annual_rate = rate;
                self.run(&variant)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::{Periodicity, RateType};
    use chrono::NaiveDate;

    fn test_terms() -> LoanTerms {
        let mut terms = LoanTerms::new(
            "runner-test",
            50_000.0,
            0.10,
            RateType::Effective,
            Periodicity::Annual,
            Periodicity::Monthly,
            120,
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        );
        terms.fixed_insurance = 15.0;
        terms
    }

    #[test]
    fn test_run_produces_schedule_and_indicators() {
        let runner = SimulationRunner::new();
        let result = runner.run(&test_terms()).unwrap();

        assert_eq!(result.schedule.len(), 120);
        assert!(result.indicators.total_paid > 50_000.0);
    }

    #[test]
    fn test_batch_isolates_failures() {
        let good = test_terms();
        let mut bad = test_terms();
        bad.principal = -1.0;

        let runner = SimulationRunner::new();
        let results = runner.run_batch(&[good, bad]);

        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[test]
    fn test_rate_variants_order_cost() {
        let runner = SimulationRunner::new();
        let results = runner.run_rate_variants(&test_terms(), &[0.06, 0.12]);

        let cheap = results[0].as_ref().unwrap();
        let dear = results[1].as_ref().unwrap();
        assert!(
            dear.indicators.annualized_cost_rate > cheap.indicators.annualized_cost_rate
        );
    }
}
