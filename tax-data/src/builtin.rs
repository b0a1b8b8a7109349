//! Rate tables compiled into the binary.
//!
//! The CSVs under `data/` are the same files `TaxTablesLoader::load_dir` reads,
//! so a tables directory can be seeded by copying them.

use tax_core::TaxTables;

use crate::{TaxTablesLoader, TaxTablesLoaderError};

const TAX_BRACKETS_CSV: &str = include_str!("../data/tax_brackets.csv");
const CAPITAL_GAINS_CSV: &str = include_str!("../data/capital_gains_rates.csv");
const STANDARD_DEDUCTIONS_CSV: &str = include_str!("../data/standard_deductions.csv");

pub const SUPPORTED_YEARS: [i32; 2] = [2024, 2025];

/// The most recent year with built-in tables.
pub const LATEST_YEAR: i32 = 2025;

/// Built-in tables for `tax_year`, already validated.
pub fn builtin_tables(tax_year: i32) -> Result<TaxTables, TaxTablesLoaderError> {
    let ordinary = TaxTablesLoader::parse_brackets(TAX_BRACKETS_CSV.as_bytes())?;
    let preferential = TaxTablesLoader::parse_brackets(CAPITAL_GAINS_CSV.as_bytes())?;
    let deductions = TaxTablesLoader::parse_standard_deductions(STANDARD_DEDUCTIONS_CSV.as_bytes())?;

    TaxTablesLoader::build(tax_year, &ordinary, &preferential, &deductions)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tax_core::{FilingStatusCode, ScheduleKind};

    use super::*;

    #[test]
    fn every_supported_year_builds() {
        for year in SUPPORTED_YEARS {
            let tables = builtin_tables(year).expect("built-in tables should validate");
            assert_eq!(tables.tax_year, year);
        }
    }

    #[test]
    fn supported_years_match_the_data() {
        let records = TaxTablesLoader::parse_brackets(TAX_BRACKETS_CSV.as_bytes()).unwrap();

        assert_eq!(TaxTablesLoader::years(&records), SUPPORTED_YEARS.to_vec());
        assert_eq!(SUPPORTED_YEARS.last(), Some(&LATEST_YEAR));
    }

    #[test]
    fn unsupported_year_is_rejected() {
        assert_eq!(
            builtin_tables(2019),
            Err(TaxTablesLoaderError::TaxYearNotFound(2019))
        );
    }

    #[test]
    fn married_filing_separately_top_bracket_starts_lower_than_single() {
        let tables = builtin_tables(2024).unwrap();

        let mfs = tables
            .schedule(ScheduleKind::Ordinary, FilingStatusCode::MarriedFilingSeparately)
            .unwrap();
        let single = tables
            .schedule(ScheduleKind::Ordinary, FilingStatusCode::Single)
            .unwrap();

        assert_eq!(mfs[6].min_income, dec!(365600));
        assert_eq!(single[6].min_income, dec!(609350));
    }

    #[test]
    fn standard_deductions_for_2025() {
        let tables = builtin_tables(2025).unwrap();
        let joint = tables
            .standard_deduction(FilingStatusCode::MarriedFilingJointly)
            .unwrap();

        assert_eq!(joint.amount, dec!(31500));
        assert_eq!(joint.additional_age_amount, dec!(1600));
    }
}
