//! Core schedule generator: grace handling, French-method amortization
//! and terminal rounding reconciliation

use crate::error::EngineError;
use crate::loan::{GraceKind, LoanTerms};
use crate::rates::{normalized_periodic_rate, round10};

use super::flows::{PeriodFlow, PeriodKind, Schedule, BALANCE_TOLERANCE};
use super::state::BalanceState;

/// Generate the full repayment schedule for the given loan terms.
///
/// Validates the terms first and never starts a partial schedule: the
/// returned sequence always covers the whole term, grace periods first,
/// amortizing periods after, with the terminal balance reconciled to
/// exactly zero.
pub fn generate_schedule(terms: &LoanTerms) -> Result<Schedule, EngineError> {
    terms.validate()?;
    Ok(ScheduleGenerator::new(terms).generate())
}

/// Builds the ordered period sequence for one loan
pub struct ScheduleGenerator<'a> {
    terms: &'a LoanTerms,
    periodic_rate: f64,
}

impl<'a> ScheduleGenerator<'a> {
    /// Terms are assumed valid; [`generate_schedule`] is the checked
    /// entry point.
    pub fn new(terms: &'a LoanTerms) -> Self {
        Self {
            terms,
            periodic_rate: normalized_periodic_rate(terms),
        }
    }

    /// The periodic effective rate the schedule will be computed with
    pub fn periodic_rate(&self) -> f64 {
        self.periodic_rate
    }

    /// Produce the complete schedule in one pass
    pub fn generate(&self) -> Schedule {
        let grace_periods = self.terms.effective_grace_periods();
        let mut state = BalanceState::new(self.terms.financed_capital());
        let mut flows = Vec::with_capacity(self.terms.term_periods as usize);

        for _ in 0..grace_periods {
            let flow = self.grace_flow(&state);
            let closing = flow.closing_balance;
            flows.push(flow);
            state.advance(closing);
        }

        // Annuity over what remains after grace, on the possibly
        // capitalized balance
        let remaining = self.terms.term_periods - grace_periods;
        let payment = annuity_payment(state.balance, self.periodic_rate, remaining);

        for _ in 0..remaining {
            let flow = self.amortization_flow(&state, payment);
            let closing = flow.closing_balance;
            flows.push(flow);
            state.advance(closing);
        }

        reconcile_final_balance(&mut flows);

        Schedule {
            name: self.terms.name.clone(),
            financed_capital: self.terms.financed_capital(),
            periodic_rate: self.periodic_rate,
            payment_frequency: self.terms.payment_frequency,
            flows,
        }
    }

    /// One grace period. Partial grace pays the interest and leaves the
    /// balance alone; total grace pays no base payment and capitalizes
    /// the interest. Insurance and commissions accrue either way.
    fn grace_flow(&self, state: &BalanceState) -> PeriodFlow {
        let interest = state.accrued_interest(self.periodic_rate);
        let insurance = state.insurance_due(self.terms.insurance_percentage);

        let (kind, base_payment, closing_balance) = if self.terms.grace_kind == GraceKind::Total {
            (PeriodKind::GraceTotal, 0.0, state.balance + interest)
        } else {
            (PeriodKind::GracePartial, interest, state.balance)
        };

        let total_payment = base_payment
            + insurance
            + self.terms.fixed_insurance
            + self.terms.periodic_commission;

        PeriodFlow {
            period: state.period,
            kind,
            due_date: self.terms.due_date(state.period),
            opening_balance: state.balance,
            closing_balance,
            base_payment,
            interest,
            amortization: 0.0,
            insurance,
            fixed_insurance: self.terms.fixed_insurance,
            commission: self.terms.periodic_commission,
            total_payment,
            periodic_rate: self.periodic_rate,
        }
    }

    /// One amortizing period under the fixed annuity
    fn amortization_flow(&self, state: &BalanceState, payment: f64) -> PeriodFlow {
        let interest = state.accrued_interest(self.periodic_rate);
        let amortization = payment - interest;
        let insurance = state.insurance_due(self.terms.insurance_percentage);
        let closing_balance = (state.balance - amortization).max(0.0);

        let total_payment =
            payment + insurance + self.terms.fixed_insurance + self.terms.periodic_commission;

        PeriodFlow {
            period: state.period,
            kind: PeriodKind::Amortization,
            due_date: self.terms.due_date(state.period),
            opening_balance: state.balance,
            closing_balance,
            base_payment: payment,
            interest,
            amortization,
            insurance,
            fixed_insurance: self.terms.fixed_insurance,
            commission: self.terms.periodic_commission,
            total_payment,
            periodic_rate: self.periodic_rate,
        }
    }
}

/// Fixed installment of the French method:
/// `balance * rate / (1 - (1 + rate)^-n)`.
///
/// Zero remaining periods yield a zero payment; a zero rate collapses to
/// straight division of the balance over the periods.
pub fn annuity_payment(balance: f64, periodic_rate: f64, periods: u32) -> f64 {
    if periods == 0 {
        return 0.0;
    }
    if periodic_rate.abs() < 1e-10 {
        return balance / periods as f64;
    }

    let factor = round10(1.0 - (1.0 + periodic_rate).powi(-(periods as i32)));
    round10(balance * periodic_rate / factor)
}

/// Force the terminal balance to exactly zero when only rounding residue
/// remains, folding the residue into the last amortization.
fn reconcile_final_balance(flows: &mut [PeriodFlow]) {
    let Some(last) = flows.last_mut() else {
        return;
    };

    if last.closing_balance.abs() < BALANCE_TOLERANCE {
        last.closing_balance = 0.0;

        if last.kind.is_amortization() {
            last.amortization = last.opening_balance;
            last.base_payment = last.interest + last.amortization;
            last.recompute_total_payment();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::{Periodicity, RateType};
    use chrono::NaiveDate;

    /// 100k loan with 20k subsidy and 10k initial fee: 70k financed at
    /// TEA 8%, 240 monthly installments, desgravamen 0.05%, fixed
    /// insurance 25, periodic commission 10
    fn scenario_terms() -> LoanTerms {
        let mut terms = LoanTerms::new(
            "mivivienda-240",
            100_000.0,
            0.08,
            RateType::Effective,
            Periodicity::Annual,
            Periodicity::Monthly,
            240,
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        );
        terms.bonus_amount = 20_000.0;
        terms.initial_fee_amount = 10_000.0;
        terms.insurance_percentage = 0.0005;
        terms.fixed_insurance = 25.0;
        terms.periodic_commission = 10.0;
        terms
    }

    #[test]
    fn test_schedule_length_without_grace() {
        let schedule = generate_schedule(&scenario_terms()).unwrap();
        assert_eq!(schedule.len(), 240);
        assert_eq!(schedule.amortization_count(), 240);
        assert_eq!(schedule.grace_count(), 0);
    }

    #[test]
    fn test_schedule_length_with_grace() {
        let mut terms = scenario_terms();
        terms.grace_kind = GraceKind::Partial;
        terms.grace_periods = 6;

        let schedule = generate_schedule(&terms).unwrap();
        assert_eq!(schedule.len(), 240);
        assert_eq!(schedule.grace_count(), 6);
        assert_eq!(schedule.amortization_count(), 234);
        assert_eq!(schedule.flows[5].kind, PeriodKind::GracePartial);
        assert_eq!(schedule.flows[6].kind, PeriodKind::Amortization);
    }

    #[test]
    fn test_periodic_rate_matches_tea_conversion() {
        let schedule = generate_schedule(&scenario_terms()).unwrap();
        // (1.08)^(30/360) - 1
        assert!((schedule.periodic_rate - 0.00643403).abs() < 1e-7);
    }

    #[test]
    fn test_first_period_interest_on_financed_capital() {
        let schedule = generate_schedule(&scenario_terms()).unwrap();
        let first = &schedule.flows[0];
        assert_eq!(first.opening_balance, 70_000.0);
        assert!((first.interest - 70_000.0 * schedule.periodic_rate).abs() < 1e-9);
    }

    #[test]
    fn test_balance_continuity() {
        let schedule = generate_schedule(&scenario_terms()).unwrap();
        for pair in schedule.flows.windows(2) {
            assert_eq!(pair[0].closing_balance, pair[1].opening_balance);
        }
    }

    #[test]
    fn test_terminal_balance_is_exactly_zero() {
        let schedule = generate_schedule(&scenario_terms()).unwrap();
        assert_eq!(schedule.final_balance(), 0.0);
    }

    #[test]
    fn test_amortization_reconciles_to_financed_capital() {
        let schedule = generate_schedule(&scenario_terms()).unwrap();
        let total: f64 = schedule
            .flows
            .iter()
            .filter(|f| f.kind.is_amortization())
            .map(|f| f.amortization)
            .sum();
        assert!((total - 70_000.0).abs() <= BALANCE_TOLERANCE);
    }

    #[test]
    fn test_amortization_rows_are_consistent() {
        let schedule = generate_schedule(&scenario_terms()).unwrap();
        // Reconciliation rewrites the last row, so check the body
        for flow in &schedule.flows[..schedule.len() - 1] {
            assert!((flow.amortization - (flow.base_payment - flow.interest)).abs() < 1e-9);
            assert!(
                (flow.closing_balance - (flow.opening_balance - flow.amortization)).abs() < 1e-9
            );
        }
    }

    #[test]
    fn test_partial_grace_pays_interest_only() {
        let mut terms = scenario_terms();
        terms.grace_kind = GraceKind::Partial;
        terms.grace_periods = 6;

        let schedule = generate_schedule(&terms).unwrap();
        for flow in schedule.flows.iter().take(6) {
            assert_eq!(flow.base_payment, flow.interest);
            assert_eq!(flow.closing_balance, flow.opening_balance);
            assert_eq!(flow.amortization, 0.0);
        }
    }

    #[test]
    fn test_total_grace_capitalizes_interest() {
        let mut terms = scenario_terms();
        terms.grace_kind = GraceKind::Total;
        terms.grace_periods = 6;

        let schedule = generate_schedule(&terms).unwrap();
        for flow in schedule.flows.iter().take(6) {
            assert_eq!(flow.base_payment, 0.0);
            assert!(flow.closing_balance > flow.opening_balance);
        }
        // Amortization starts from the grown balance
        assert!(schedule.flows[6].opening_balance > 70_000.0);
        assert_eq!(schedule.final_balance(), 0.0);
    }

    #[test]
    fn test_grace_periods_still_accrue_fixed_costs() {
        let mut terms = scenario_terms();
        terms.grace_kind = GraceKind::Total;
        terms.grace_periods = 3;

        let schedule = generate_schedule(&terms).unwrap();
        let first = &schedule.flows[0];
        assert_eq!(first.fixed_insurance, 25.0);
        assert_eq!(first.commission, 10.0);
        assert!((first.total_payment - (first.insurance + 25.0 + 10.0)).abs() < 1e-9);
    }

    #[test]
    fn test_zero_rate_divides_balance_evenly() {
        let mut terms = scenario_terms();
        terms.annual_rate = 0.0;

        let schedule = generate_schedule(&terms).unwrap();
        let first = &schedule.flows[0];
        assert_eq!(first.interest, 0.0);
        assert!((first.base_payment - 70_000.0 / 240.0).abs() < 1e-9);
        assert_eq!(schedule.final_balance(), 0.0);
    }

    #[test]
    fn test_quarterly_frequency_schedule() {
        let mut terms = scenario_terms();
        terms.payment_frequency = Periodicity::Quarterly;
        terms.term_periods = 80;

        let schedule = generate_schedule(&terms).unwrap();
        assert_eq!(schedule.len(), 80);
        // (1.08)^(90/360) - 1
        assert!((schedule.periodic_rate - 0.0194265469).abs() < 1e-8);
        assert_eq!(schedule.final_balance(), 0.0);
    }

    #[test]
    fn test_generation_is_idempotent() {
        let terms = scenario_terms();
        let first = generate_schedule(&terms).unwrap();
        let second = generate_schedule(&terms).unwrap();
        assert_eq!(first.flows, second.flows);
    }

    #[test]
    fn test_invalid_terms_are_rejected() {
        let mut terms = scenario_terms();
        terms.principal = 0.0;
        assert!(matches!(
            generate_schedule(&terms),
            Err(EngineError::InvalidLoanTerms(_))
        ));
    }

    #[test]
    fn test_annuity_payment_known_value() {
        // 1000 at 1% over 12 periods
        let payment = annuity_payment(1000.0, 0.01, 12);
        assert!((payment - 88.8488).abs() < 1e-3);
    }

    #[test]
    fn test_annuity_payment_edge_cases() {
        assert_eq!(annuity_payment(1000.0, 0.01, 0), 0.0);
        assert_eq!(annuity_payment(1200.0, 0.0, 12), 100.0);
    }
}
