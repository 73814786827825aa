//! Financial transparency indicators derived from a completed schedule

mod irr;
mod npv;
mod summary;

pub use irr::{bisect_irr, IrrResult, IRR_MAX_ITERATIONS, IRR_PRECISION};
pub use npv::{cash_flows, npv_at_annual_rate, npv_at_periodic_rate};
pub use summary::{compute_indicators, IndicatorSummary};
