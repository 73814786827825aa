//! Repayment-schedule generation

mod engine;
mod flows;
mod state;

pub use engine::{annuity_payment, generate_schedule, ScheduleGenerator};
pub use flows::{PeriodFlow, PeriodKind, Schedule, BALANCE_TOLERANCE};
pub use state::BalanceState;
