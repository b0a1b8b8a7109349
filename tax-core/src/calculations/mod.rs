//! Federal income tax calculation.
//!
//! [`TaxCalculator`] walks the 1040 flow from gross income to the final tax or
//! refund. The schedule engine and the attribution step are exposed for callers
//! that want to run a single piece, and [`audit_breakdown`] checks a finished
//! breakdown from any source against the same arithmetic.

mod attribution;
mod audit;
mod calculator;
pub mod common;
mod schedule;

pub use attribution::attribute_tax;
pub use audit::{AuditFinding, audit_breakdown, compare_breakdowns};
pub use calculator::{MAX_AMOUNT, TaxCalculator};
pub use schedule::{ScheduleOutcome, apply_progressive, apply_stacked};
