//! Typed errors for the calculation engine

use thiserror::Error;

/// Errors produced by schedule generation and indicator calculation.
///
/// Every variant is deterministic for a given input: nothing here is
/// transient or retryable, and a failure for one loan never affects
/// another.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Loan terms failed upfront validation; no calculation was started.
    #[error("invalid loan terms: {0}")]
    InvalidLoanTerms(String),

    /// Indicator calculation was handed a schedule with no periods.
    #[error("cannot compute indicators on an empty schedule")]
    EmptySchedule,
}
