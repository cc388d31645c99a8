//! Domain types for period-level trading results.

mod record;

pub use record::{PeriodRecord, validate_records};
