pub mod calculations;
mod error;
pub mod models;

pub use calculations::{AuditFinding, TaxCalculator, audit_breakdown, compare_breakdowns};
pub use error::{ComputationError, TaxCalculatorError, ValidationError};
pub use models::*;
