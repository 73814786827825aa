//! Schedule output structures

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::loan::Periodicity;

/// Residual below which the terminal balance is forced to exactly zero.
/// The same tolerance bounds the amortization-total reconciliation check.
pub const BALANCE_TOLERANCE: f64 = 0.01;

/// Kind of a schedule period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodKind {
    /// Grace period paying interest only
    GracePartial,
    /// Grace period paying nothing; interest capitalizes
    GraceTotal,
    /// Regular French-method installment
    Amortization,
}

impl PeriodKind {
    pub fn is_grace(&self) -> bool {
        matches!(self, PeriodKind::GracePartial | PeriodKind::GraceTotal)
    }

    pub fn is_amortization(&self) -> bool {
        matches!(self, PeriodKind::Amortization)
    }

    /// String form used in exported schedules
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKind::GracePartial => "GRACE_PARTIAL",
            PeriodKind::GraceTotal => "GRACE_TOTAL",
            PeriodKind::Amortization => "AMORTIZATION",
        }
    }
}

/// One row of the repayment schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodFlow {
    /// Period number (1-indexed; the disbursement is period 0 and has no row)
    pub period: u32,

    /// Period kind
    pub kind: PeriodKind,

    /// Payment due date
    pub due_date: NaiveDate,

    /// Balance at the start of the period
    pub opening_balance: f64,

    /// Balance at the end of the period
    pub closing_balance: f64,

    /// Principal + interest component of the installment
    pub base_payment: f64,

    /// Interest accrued this period
    pub interest: f64,

    /// Principal repaid this period
    pub amortization: f64,

    /// Life insurance on the opening balance
    pub insurance: f64,

    /// Fixed property insurance
    pub fixed_insurance: f64,

    /// Periodic commission
    pub commission: f64,

    /// Everything the borrower pays this period
    pub total_payment: f64,

    /// Periodic effective rate the period was computed with
    pub periodic_rate: f64,
}

impl PeriodFlow {
    /// Re-derive the total payment from its components
    pub fn recompute_total_payment(&mut self) {
        self.total_payment =
            self.base_payment + self.insurance + self.fixed_insurance + self.commission;
    }
}

/// Complete, reconciled schedule for one loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Loan label carried from the terms
    pub name: String,

    /// Capital the schedule amortizes
    pub financed_capital: f64,

    /// Normalized periodic effective rate
    pub periodic_rate: f64,

    /// Payment frequency the periods follow
    pub payment_frequency: Periodicity,

    /// Ordered period rows, 1..=term
    pub flows: Vec<PeriodFlow>,
}

impl Schedule {
    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    pub fn periods_per_year(&self) -> u32 {
        self.payment_frequency.periods_per_year()
    }

    /// Closing balance of the last period
    pub fn final_balance(&self) -> f64 {
        self.flows.last().map(|f| f.closing_balance).unwrap_or(0.0)
    }

    /// Number of grace periods in the schedule
    pub fn grace_count(&self) -> usize {
        self.flows.iter().filter(|f| f.kind.is_grace()).count()
    }

    /// Number of amortizing periods in the schedule
    pub fn amortization_count(&self) -> usize {
        self.flows.iter().filter(|f| f.kind.is_amortization()).count()
    }
}
