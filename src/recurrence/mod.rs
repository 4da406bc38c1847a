//! Recurrence rules and the expected-occurrence engine.
//!
//! Everything in here is pure: callers supply the reference day explicitly
//! and the functions never touch storage or the system clock.

pub mod evaluator;
pub mod month;
pub mod projector;
pub mod rule;
pub mod stamp;

pub use evaluator::{is_expected_occurrence, months_between, weeks_between};
pub use month::{YearMonth, YearMonthError};
pub use projector::{
    project_month, MonthProjection, OccurrenceDay, OccurrenceLabel, RejectedTransaction,
};
pub use rule::{Frequency, RecurrenceRule, RuleBuilder, RuleError};
pub use stamp::{DateStamp, DateStampError, Dated};
