//! Tax table data for the estimator.
//!
//! Rate schedules and standard deductions live in CSV files; this crate parses
//! them into validated [`tax_core::TaxTables`].

mod builtin;
mod loader;

pub use builtin::{LATEST_YEAR, SUPPORTED_YEARS, builtin_tables};
pub use loader::{
    CAPITAL_GAINS_FILE, STANDARD_DEDUCTIONS_FILE, StandardDeductionRecord, TAX_BRACKETS_FILE,
    TaxBracketRecord, TaxTablesLoader, TaxTablesLoaderError,
};
