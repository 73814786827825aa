//! Loan terms and portfolio input

mod data;
mod loader;

pub use data::{Currency, GraceKind, LoanTerms, Periodicity, RateType};
pub use loader::{load_loans, load_loans_from_reader};
