//! Loan terms data structures matching the simulation input format

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Whether the quoted annual rate is nominal or effective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateType {
    /// Nominal annual rate, compounds at the capitalization period
    Nominal,
    /// Effective annual rate
    Effective,
}

/// Period length used for both capitalization and payment frequency
///
/// Day counts follow the 360-day commercial year convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Periodicity {
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
}

impl Periodicity {
    /// Days in one period under the 360-day year
    pub fn days(&self) -> u32 {
        match self {
            Periodicity::Monthly => 30,
            Periodicity::Quarterly => 90,
            Periodicity::SemiAnnual => 180,
            Periodicity::Annual => 360,
        }
    }

    /// Number of periods in one year
    pub fn periods_per_year(&self) -> u32 {
        360 / self.days()
    }

    /// Calendar months spanned by one period
    pub fn months(&self) -> u32 {
        match self {
            Periodicity::Monthly => 1,
            Periodicity::Quarterly => 3,
            Periodicity::SemiAnnual => 6,
            Periodicity::Annual => 12,
        }
    }
}

/// Grace period treatment at the start of the schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraceKind {
    /// No grace periods; the schedule amortizes from period 1
    None,
    /// Interest is paid each grace period, principal untouched
    Partial,
    /// Nothing is paid; interest capitalizes into the balance.
    /// Fixed insurance and the periodic commission still accrue during
    /// these periods (pending product clarification).
    Total,
}

/// Currency tag carried through to reports; no conversion happens here
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    Pen,
    Usd,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Pen => "PEN",
            Currency::Usd => "USD",
        }
    }
}

/// Fully-resolved terms of one installment loan
///
/// Immutable once calculation starts: the schedule generator and the
/// indicator calculator only ever read from this record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Label carried through to reports
    pub name: String,

    /// Currency tag (display only)
    pub currency: Currency,

    /// Requested loan amount
    pub principal: f64,

    /// Upfront subsidy deducted from the principal
    pub bonus_amount: f64,

    /// Upfront initial fee deducted from the principal
    pub initial_fee_amount: f64,

    /// Quoted annual rate as a decimal (0.08 = 8%)
    pub annual_rate: f64,

    /// Whether the annual rate is nominal or effective
    pub rate_type: RateType,

    /// Capitalization period for nominal rates
    pub capitalization: Periodicity,

    /// Payment frequency of the schedule
    pub payment_frequency: Periodicity,

    /// Total term in payment periods
    pub term_periods: u32,

    /// Grace period treatment
    pub grace_kind: GraceKind,

    /// Grace length in periods (ignored when grace kind is None)
    pub grace_periods: u32,

    /// Per-period life insurance as a fraction of the opening balance
    pub insurance_percentage: f64,

    /// Fixed per-period property insurance amount
    pub fixed_insurance: f64,

    /// One-off commission charged at disbursement
    pub initial_commission: f64,

    /// Commission charged every period
    pub periodic_commission: f64,

    /// One-off commission charged at the end of the term
    pub final_commission: f64,

    /// Disbursement date; period due dates are derived from it
    pub disbursement_date: NaiveDate,

    /// Annual discount rate for NPV (effective), if the caller wants NPV
    #[serde(default)]
    pub discount_rate: Option<f64>,

    /// PEN/USD exchange rate, carried for display by outer layers
    #[serde(default)]
    pub exchange_rate: Option<f64>,
}

impl LoanTerms {
    /// Create terms with the required fields; fees, insurance and
    /// commissions start at zero and can be set directly afterwards.
    pub fn new(
        name: impl Into<String>,
        principal: f64,
        annual_rate: f64,
        rate_type: RateType,
        capitalization: Periodicity,
        payment_frequency: Periodicity,
        term_periods: u32,
        disbursement_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            currency: Currency::Pen,
            principal,
            bonus_amount: 0.0,
            initial_fee_amount: 0.0,
            annual_rate,
            rate_type,
            capitalization,
            payment_frequency,
            term_periods,
            grace_kind: GraceKind::None,
            grace_periods: 0,
            insurance_percentage: 0.0,
            fixed_insurance: 0.0,
            initial_commission: 0.0,
            periodic_commission: 0.0,
            final_commission: 0.0,
            disbursement_date,
            discount_rate: None,
            exchange_rate: None,
        }
    }

    /// Capital actually financed after the subsidy and initial fee,
    /// floored at zero
    pub fn financed_capital(&self) -> f64 {
        (self.principal - self.bonus_amount - self.initial_fee_amount).max(0.0)
    }

    /// Grace periods actually applied: zero unless a grace kind is set
    pub fn effective_grace_periods(&self) -> u32 {
        match self.grace_kind {
            GraceKind::None => 0,
            GraceKind::Partial | GraceKind::Total => self.grace_periods,
        }
    }

    /// Number of amortizing periods (term minus applied grace)
    pub fn amortization_periods(&self) -> u32 {
        self.term_periods - self.effective_grace_periods()
    }

    /// Due date of period k (k = 0 is the disbursement date).
    /// Saturates at the end of the calendar rather than overflowing.
    pub fn due_date(&self, period: u32) -> NaiveDate {
        self.disbursement_date
            .checked_add_months(Months::new(period * self.payment_frequency.months()))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Validate the terms before any calculation starts.
    ///
    /// Everything rejected here is a caller error; the engine never
    /// retries or repairs inputs.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.principal <= 0.0 {
            return Err(EngineError::InvalidLoanTerms(format!(
                "principal must be positive, got {}",
                self.principal
            )));
        }
        if self.term_periods == 0 {
            return Err(EngineError::InvalidLoanTerms(
                "term must be at least one period".to_string(),
            ));
        }
        if self.grace_periods >= self.term_periods {
            return Err(EngineError::InvalidLoanTerms(format!(
                "grace length {} must be shorter than the term {}",
                self.grace_periods, self.term_periods
            )));
        }

        let non_negative = [
            ("annual rate", self.annual_rate),
            ("bonus amount", self.bonus_amount),
            ("initial fee", self.initial_fee_amount),
            ("insurance percentage", self.insurance_percentage),
            ("fixed insurance", self.fixed_insurance),
            ("initial commission", self.initial_commission),
            ("periodic commission", self.periodic_commission),
            ("final commission", self.final_commission),
        ];
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(EngineError::InvalidLoanTerms(format!(
                    "{} must not be negative, got {}",
                    field, value
                )));
            }
        }
        if let Some(rate) = self.discount_rate {
            if rate < 0.0 {
                return Err(EngineError::InvalidLoanTerms(format!(
                    "discount rate must not be negative, got {}",
                    rate
                )));
            }
        }

        if self.financed_capital() <= 0.0 {
            return Err(EngineError::InvalidLoanTerms(
                "financed capital is zero: subsidy and initial fee cover the full principal"
                    .to_string(),
            ));
        }

        Ok(())
    }
}
