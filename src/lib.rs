//! Credit Engine - repayment schedules and financial transparency indicators
//!
//! This library provides:
//! - Rate normalization between annual conventions and payment periods
//! - French-method schedule generation with partial/total grace periods
//! - NPV, IRR and annualized-cost-rate (TCEA-style) calculation
//! - Batch simulation over loan portfolios

pub mod error;
pub mod indicators;
pub mod loan;
pub mod rates;
pub mod scenario;
pub mod schedule;

// Re-export commonly used types
pub use error::EngineError;
pub use indicators::{compute_indicators, IndicatorSummary};
pub use loan::{Currency, GraceKind, LoanTerms, Periodicity, RateType};
pub use scenario::{SimulationResult, SimulationRunner};
pub use schedule::{generate_schedule, PeriodFlow, PeriodKind, Schedule};
