mod breakdown;
mod credit;
mod deduction;
mod filing_status;
mod income;
mod situation;
mod standard_deduction;
mod tax_bracket;
mod tax_input;
mod tax_tables;

pub use breakdown::{IncomeTaxDetail, TaxBracketSlice, TaxBreakdown};
pub use credit::{CreditKind, CreditLine, Refundability};
pub use deduction::{DeductionGroup, DeductionKind, DeductionLine};
pub use filing_status::FilingStatusCode;
pub use income::{IncomeGroup, IncomeLine, IncomeSource, TaxCharacter};
pub use situation::Situation;
pub use standard_deduction::StandardDeduction;
pub use tax_bracket::{ScheduleKind, TaxBracket};
pub use tax_input::TaxInput;
pub use tax_tables::TaxTables;
