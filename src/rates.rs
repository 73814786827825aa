//! Rate normalization between annual conventions and the payment period
//!
//! All conversions use the 360-day commercial year. Intermediate results
//! are kept at a fixed precision of ten decimal places, rounded half-up:
//! the exponentiation itself runs in floating point and the result is
//! rounded back immediately, so two runs over the same terms produce
//! identical rates.

use crate::loan::{LoanTerms, Periodicity, RateType};

/// Decimal places every intermediate rate is rounded to
pub const RATE_SCALE: u32 = 10;

/// Round half-up (away from zero) to [`RATE_SCALE`] decimal places
pub fn round10(value: f64) -> f64 {
    (value * 1e10).round() / 1e10
}

/// Convert a quoted annual rate to an effective annual rate.
///
/// Nominal rates compound at the capitalization period:
/// `m = 360 / capitalization days`, `(1 + rate/m)^m - 1`.
/// Effective rates pass through unchanged.
pub fn annual_effective_rate(
    annual_rate: f64,
    rate_type: RateType,
    capitalization: Periodicity,
) -> f64 {
    match rate_type {
        RateType::Effective => annual_rate,
        RateType::Nominal => {
            let m = round10(360.0 / capitalization.days() as f64);
            let rate_per_cap = round10(annual_rate / m);
            round10((1.0 + rate_per_cap).powf(m) - 1.0)
        }
    }
}

/// Periodic effective rate for a payment frequency:
/// `(1 + effective annual)^(period days / 360) - 1`
pub fn periodic_effective_rate(effective_annual: f64, frequency: Periodicity) -> f64 {
    let exponent = round10(frequency.days() as f64 / 360.0);
    round10((1.0 + effective_annual).powf(exponent) - 1.0)
}

/// Periodic effective rate for a loan's quoted rate and payment frequency
pub fn normalized_periodic_rate(terms: &LoanTerms) -> f64 {
    let effective =
        annual_effective_rate(terms.annual_rate, terms.rate_type, terms.capitalization);
    periodic_effective_rate(effective, terms.payment_frequency)
}

/// Annualize a periodic rate: `(1 + rate)^periods_per_year - 1`
pub fn annualize(periodic_rate: f64, periods_per_year: u32) -> f64 {
    round10((1.0 + periodic_rate).powi(periods_per_year as i32) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_round10_fixed_scale() {
        assert_eq!(round10(0.12345678904), 0.123456789);
        assert_eq!(round10(0.12345678906), 0.1234567891);
        assert_eq!(round10(1.5), 1.5);
        assert_eq!(round10(-0.12345678906), -0.1234567891);
    }

    #[test]
    fn test_effective_rate_passes_through() {
        let rate = annual_effective_rate(0.08, RateType::Effective, Periodicity::Annual);
        assert_eq!(rate, 0.08);
    }

    #[test]
    fn test_nominal_monthly_capitalization() {
        // TNA 12% capitalized monthly: (1 + 0.01)^12 - 1
        let rate = annual_effective_rate(0.12, RateType::Nominal, Periodicity::Monthly);
        assert_abs_diff_eq!(rate, 0.1268250301, epsilon = 1e-10);
    }

    #[test]
    fn test_nominal_annual_capitalization_is_identity() {
        // m = 1, so the conversion collapses to the quoted rate
        let rate = annual_effective_rate(0.10, RateType::Nominal, Periodicity::Annual);
        assert_abs_diff_eq!(rate, 0.10, epsilon = 1e-10);
    }

    #[test]
    fn test_monthly_periodic_rate_from_tea() {
        // TEA 8% to monthly: (1.08)^(30/360) - 1
        let tep = periodic_effective_rate(0.08, Periodicity::Monthly);
        assert_abs_diff_eq!(tep, 0.00643403, epsilon = 1e-8);
    }

    #[test]
    fn test_annual_frequency_periodic_rate_is_annual() {
        let tep = periodic_effective_rate(0.08, Periodicity::Annual);
        assert_abs_diff_eq!(tep, 0.08, epsilon = 1e-10);
    }

    #[test]
    fn test_annualize_inverts_periodic_conversion() {
        let tep = periodic_effective_rate(0.08, Periodicity::Monthly);
        let back = annualize(tep, 12);
        assert_abs_diff_eq!(back, 0.08, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_rate_stays_zero() {
        assert_eq!(periodic_effective_rate(0.0, Periodicity::Monthly), 0.0);
        assert_eq!(
            annual_effective_rate(0.0, RateType::Nominal, Periodicity::Quarterly),
            0.0
        );
    }
}
