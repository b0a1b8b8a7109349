use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{ComputationError, FilingStatusCode, StandardDeduction, TaxBracket, TaxTables};
use thiserror::Error;
use tracing::debug;

/// File names `load_dir` expects inside a tables directory.
pub const TAX_BRACKETS_FILE: &str = "tax_brackets.csv";
pub const CAPITAL_GAINS_FILE: &str = "capital_gains_rates.csv";
pub const STANDARD_DEDUCTIONS_FILE: &str = "standard_deductions.csv";

/// Errors that can occur when loading tax tables.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaxTablesLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Invalid filing status: {0}")]
    InvalidFilingStatus(String),

    #[error("Tax year {0} not found in the tables")]
    TaxYearNotFound(i32),

    #[error("Failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Invalid tables: {0}")]
    Tables(#[from] ComputationError),
}

impl From<csv::Error> for TaxTablesLoaderError {
    fn from(err: csv::Error) -> Self {
        TaxTablesLoaderError::CsvParse(err.to_string())
    }
}

/// Maps IRS schedule codes to filing statuses.
///
/// - Schedule X → Single (S)
/// - Schedule Y-1 → Married Filing Jointly (MFJ)
/// - Schedule Y-2 → Married Filing Separately (MFS)
/// - Schedule Z → Head of Household (HOH)
fn schedule_to_filing_status(schedule: &str) -> Result<FilingStatusCode, TaxTablesLoaderError> {
    match schedule {
        "X" => Ok(FilingStatusCode::Single),
        "Y-1" => Ok(FilingStatusCode::MarriedFilingJointly),
        "Y-2" => Ok(FilingStatusCode::MarriedFilingSeparately),
        "Z" => Ok(FilingStatusCode::HeadOfHousehold),
        _ => Err(TaxTablesLoaderError::InvalidSchedule(schedule.to_string())),
    }
}

/// A single record from a rate schedule CSV file.
///
/// Ordinary brackets and capital gains tiers share this format:
/// - `tax_year`: The tax year (e.g., 2025)
/// - `schedule`: The IRS schedule code (X, Y-1, Y-2, Z)
/// - `min_income`: The minimum income for this bracket
/// - `max_income`: The maximum income for this bracket (empty for unlimited)
/// - `base_tax`: The tax owed on all brackets below this one
/// - `rate`: The marginal tax rate as a decimal (e.g., 0.10 for 10%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxBracketRecord {
    pub tax_year: i32,
    pub schedule: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub base_tax: Decimal,
    pub rate: Decimal,
}

impl TaxBracketRecord {
    fn to_bracket(&self) -> Result<TaxBracket, TaxTablesLoaderError> {
        Ok(TaxBracket {
            filing_status: schedule_to_filing_status(&self.schedule)?,
            min_income: self.min_income,
            max_income: self.max_income,
            tax_rate: self.rate,
            base_tax: self.base_tax,
        })
    }
}

/// A single record from the standard deductions CSV file.
///
/// `filing_status` is a status code (S, MFJ, MFS, HOH) and
/// `additional_age_amount` is added once per taxpayer at or above the senior age.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StandardDeductionRecord {
    pub tax_year: i32,
    pub filing_status: String,
    pub amount: Decimal,
    pub additional_age_amount: Decimal,
}

impl StandardDeductionRecord {
    fn to_standard_deduction(&self) -> Result<StandardDeduction, TaxTablesLoaderError> {
        let filing_status = FilingStatusCode::parse(&self.filing_status)
            .ok_or_else(|| TaxTablesLoaderError::InvalidFilingStatus(self.filing_status.clone()))?;

        Ok(StandardDeduction {
            filing_status,
            amount: self.amount,
            additional_age_amount: self.additional_age_amount,
        })
    }
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn parse_records<R, T>(reader: R) -> Result<Vec<T>, TaxTablesLoaderError>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for result in csv_reader.deserialize() {
        let record: T = result?;
        records.push(record);
    }

    Ok(records)
}

fn open(path: &Path) -> Result<File, TaxTablesLoaderError> {
    File::open(path).map_err(|e| TaxTablesLoaderError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Loader for tax tables from CSV files.
///
/// The bracket CSVs use IRS schedule codes (X, Y-1, Y-2, Z) which are mapped
/// to filing statuses; the standard deduction CSV uses status codes directly.
pub struct TaxTablesLoader;

impl TaxTablesLoader {
    /// Parse rate schedule records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or a
    /// string slice.
    pub fn parse_brackets<R: Read>(
        reader: R
    ) -> Result<Vec<TaxBracketRecord>, TaxTablesLoaderError> {
        parse_records(reader)
    }

    /// Parse standard deduction records from a CSV reader.
    pub fn parse_standard_deductions<R: Read>(
        reader: R
    ) -> Result<Vec<StandardDeductionRecord>, TaxTablesLoaderError> {
        parse_records(reader)
    }

    /// Tax years with ordinary brackets in `records`, ascending.
    pub fn years(records: &[TaxBracketRecord]) -> Vec<i32> {
        let mut years: Vec<i32> = records.iter().map(|r| r.tax_year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// Assemble and validate the tables for `tax_year`.
    ///
    /// Records for other years are ignored, so one set of files can carry
    /// several years.
    pub fn build(
        tax_year: i32,
        ordinary: &[TaxBracketRecord],
        preferential: &[TaxBracketRecord],
        deductions: &[StandardDeductionRecord],
    ) -> Result<TaxTables, TaxTablesLoaderError> {
        if !ordinary.iter().any(|r| r.tax_year == tax_year) {
            return Err(TaxTablesLoaderError::TaxYearNotFound(tax_year));
        }

        let brackets_for_year = |records: &[TaxBracketRecord]| {
            records
                .iter()
                .filter(|r| r.tax_year == tax_year)
                .map(TaxBracketRecord::to_bracket)
                .collect::<Result<Vec<_>, _>>()
        };

        let tables = TaxTables {
            ordinary_brackets: brackets_for_year(ordinary)?,
            preferential_brackets: brackets_for_year(preferential)?,
            standard_deductions: deductions
                .iter()
                .filter(|r| r.tax_year == tax_year)
                .map(StandardDeductionRecord::to_standard_deduction)
                .collect::<Result<Vec<_>, _>>()?,
            ..TaxTables::new(tax_year)
        };

        tables.validate()?;

        debug!(
            tax_year,
            ordinary = tables.ordinary_brackets.len(),
            preferential = tables.preferential_brackets.len(),
            deductions = tables.standard_deductions.len(),
            "tax tables built"
        );
        Ok(tables)
    }

    /// Load the tables for `tax_year` from the three CSV files in `dir`.
    pub fn load_dir(
        dir: &Path,
        tax_year: i32,
    ) -> Result<TaxTables, TaxTablesLoaderError> {
        let ordinary = Self::parse_brackets(open(&dir.join(TAX_BRACKETS_FILE))?)?;
        let preferential = Self::parse_brackets(open(&dir.join(CAPITAL_GAINS_FILE))?)?;
        let deductions =
            Self::parse_standard_deductions(open(&dir.join(STANDARD_DEDUCTIONS_FILE))?)?;

        Self::build(tax_year, &ordinary, &preferential, &deductions)
    }
}
