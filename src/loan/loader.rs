//! Load loan terms from a portfolio CSV

use chrono::NaiveDate;
use csv::Reader;
use std::error::Error;
use std::path::Path;

use super::{Currency, GraceKind, LoanTerms, Periodicity, RateType};

/// Raw CSV row matching the portfolio column names
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Currency")]
    currency: String,
    #[serde(rename = "Principal")]
    principal: f64,
    #[serde(rename = "BonusAmount")]
    bonus_amount: f64,
    #[serde(rename = "InitialFee")]
    initial_fee_amount: f64,
    #[serde(rename = "AnnualRate")]
    annual_rate: f64,
    #[serde(rename = "RateType")]
    rate_type: String,
    #[serde(rename = "Capitalization")]
    capitalization: String,
    #[serde(rename = "PaymentFrequency")]
    payment_frequency: String,
    #[serde(rename = "TermPeriods")]
    term_periods: u32,
    #[serde(rename = "GraceKind")]
    grace_kind: String,
    #[serde(rename = "GracePeriods")]
    grace_periods: u32,
    #[serde(rename = "InsurancePct")]
    insurance_percentage: f64,
    #[serde(rename = "FixedInsurance")]
    fixed_insurance: f64,
    #[serde(rename = "InitialCommission")]
    initial_commission: f64,
    #[serde(rename = "PeriodicCommission")]
    periodic_commission: f64,
    #[serde(rename = "FinalCommission")]
    final_commission: f64,
    #[serde(rename = "DisbursementDate")]
    disbursement_date: NaiveDate,
    #[serde(rename = "DiscountRate")]
    discount_rate: Option<f64>,
    #[serde(rename = "ExchangeRate")]
    exchange_rate: Option<f64>,
}

fn parse_periodicity(value: &str) -> Result<Periodicity, Box<dyn Error>> {
    match value {
        "MONTHLY" => Ok(Periodicity::Monthly),
        "QUARTERLY" => Ok(Periodicity::Quarterly),
        "SEMI_ANNUAL" => Ok(Periodicity::SemiAnnual),
        "ANNUAL" => Ok(Periodicity::Annual),
        other => Err(format!("Unknown periodicity: {}", other).into()),
    }
}

impl CsvRow {
    fn to_terms(self) -> Result<LoanTerms, Box<dyn Error>> {
        let currency = match self.currency.as_str() {
            "PEN" => Currency::Pen,
            "USD" => Currency::Usd,
            other => return Err(format!("Unknown Currency: {}", other).into()),
        };

        let rate_type = match self.rate_type.as_str() {
            "NOMINAL" => RateType::Nominal,
            "EFFECTIVE" => RateType::Effective,
            other => return Err(format!("Unknown RateType: {}", other).into()),
        };

        let grace_kind = match self.grace_kind.as_str() {
            "NONE" => GraceKind::None,
            "PARTIAL" => GraceKind::Partial,
            "TOTAL" => GraceKind::Total,
            other => return Err(format!("Unknown GraceKind: {}", other).into()),
        };

        Ok(LoanTerms {
            name: self.name,
            currency,
            principal: self.principal,
            bonus_amount: self.bonus_amount,
            initial_fee_amount: self.initial_fee_amount,
            annual_rate: self.annual_rate,
            rate_type,
            capitalization: parse_periodicity(&self.capitalization)?,
            payment_frequency: parse_periodicity(&self.payment_frequency)?,
            term_periods: self.term_periods,
            grace_kind,
            grace_periods: self.grace_periods,
            insurance_percentage: self.insurance_percentage,
            fixed_insurance: self.fixed_insurance,
            initial_commission: self.initial_commission,
            periodic_commission: self.periodic_commission,
            final_commission: self.final_commission,
            disbursement_date: self.disbursement_date,
            discount_rate: self.discount_rate,
            exchange_rate: self.exchange_rate,
        })
    }
}

/// Load all loans from a CSV file
pub fn load_loans<P: AsRef<Path>>(path: P) -> Result<Vec<LoanTerms>, Box<dyn Error>> {
    let mut reader = Reader::from_path(path)?;
    let mut loans = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        loans.push(row.to_terms()?);
    }

    Ok(loans)
}

/// Load loans from any reader (e.g., string buffer, network stream)
pub fn load_loans_from_reader<R: std::io::Read>(
    reader: R,
) -> Result<Vec<LoanTerms>, Box<dyn Error>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut loans = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        loans.push(row.to_terms()?);
    }

    Ok(loans)
}
