//! CSV loader for batch calculations.
//!
//! ## CSV Format
//!
//! One scenario per row. Column order does not matter; headers are matched by
//! name and are case-sensitive.
//!
//! | Column          | Required | Notes                                            |
//! |-----------------|----------|--------------------------------------------------|
//! | `filing_status` | yes      | `S`, `MFJ`, `MFS`, `HOH` or the form key         |
//! | `age`           | yes      | Whole years                                      |
//! | `spouse_age`    | no       | Read only for `MFJ`                              |
//! | `name`          | no       | Free text echoed in the output                   |
//! | catalog key     | no       | Any income, deduction or credit key, e.g. `wages` |
//!
//! Amount cells accept the same text as the interactive form: commas and `$`
//! are ignored and an empty cell is zero.
//!
//! ```csv
//! name,filing_status,age,spouse_age,wages,longTermCapitalGains,eitc
//! starter,S,24,,38000,,
//! retirees,MFJ,67,66,,12000,
//! ```

use std::path::{Path, PathBuf};

use tax_core::{CreditKind, DeductionKind, FilingStatusCode, IncomeSource, TaxInput};
use thiserror::Error;

use crate::form::{FormErrors, TaxForm};

/// Errors that can occur while loading a batch file.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bad structure, e.g. a row with the wrong number of cells.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("required column '{0}' is missing")]
    MissingColumn(&'static str),

    /// `row` is 1-based; the header is row 0.
    #[error("unrecognised filing status '{status}' on row {row}")]
    InvalidFilingStatus { status: String, row: usize },

    #[error("row {row}: {errors}")]
    InvalidRow { row: usize, errors: FormErrors },
}

/// One parsed scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRow {
    /// 1-based data row number.
    pub row: usize,
    pub name: Option<String>,
    pub input: TaxInput,
}

impl BatchRow {
    /// The name if one was given, otherwise `row N`.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("row {}", self.row),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Column {
    Name,
    FilingStatus,
    Age,
    SpouseAge,
    Income(IncomeSource),
    Deduction(DeductionKind),
    Credit(CreditKind),
}

impl Column {
    fn from_header(header: &str) -> Result<Self, BatchError> {
        let column = match header {
            "name" => Self::Name,
            "filing_status" => Self::FilingStatus,
            "age" => Self::Age,
            "spouse_age" => Self::SpouseAge,
            key => IncomeSource::from_key(key)
                .map(Self::Income)
                .or_else(|| DeductionKind::from_key(key).map(Self::Deduction))
                .or_else(|| CreditKind::from_key(key).map(Self::Credit))
                .ok_or_else(|| BatchError::UnknownColumn(key.to_string()))?,
        };
        Ok(column)
    }
}

fn read_columns(headers: &csv::StringRecord) -> Result<Vec<Column>, BatchError> {
    let columns = headers
        .iter()
        .map(Column::from_header)
        .collect::<Result<Vec<_>, _>>()?;

    if !columns.iter().any(|c| matches!(c, Column::FilingStatus)) {
        return Err(BatchError::MissingColumn("filing_status"));
    }
    if !columns.iter().any(|c| matches!(c, Column::Age)) {
        return Err(BatchError::MissingColumn("age"));
    }
    Ok(columns)
}

/// Convert a single CSV record into a scenario.
fn convert_record(
    columns: &[Column],
    record: &csv::StringRecord,
    row: usize,
) -> Result<BatchRow, BatchError> {
    let mut form = TaxForm::default();
    let mut name = None;

    for (column, cell) in columns.iter().zip(record.iter()) {
        match column {
            Column::Name if !cell.is_empty() => name = Some(cell.to_string()),
            Column::Name => {}
            Column::FilingStatus => {
                form.filing_status = FilingStatusCode::parse(cell).ok_or_else(|| {
                    BatchError::InvalidFilingStatus {
                        status: cell.to_string(),
                        row,
                    }
                })?;
            }
            Column::Age => form.age = cell.to_string(),
            Column::SpouseAge => form.spouse_age = cell.to_string(),
            Column::Income(source) => {
                form.income.insert(*source, cell.to_string());
            }
            Column::Deduction(kind) => {
                form.deductions.insert(*kind, cell.to_string());
            }
            Column::Credit(kind) => {
                form.credits.insert(*kind, cell.to_string());
            }
        }
    }

    let input = form
        .collect()
        .map_err(|errors| BatchError::InvalidRow { row, errors })?;
    Ok(BatchRow { row, name, input })
}

/// Parse CSV text and return the scenarios in file order.
///
/// # Errors
///
/// * [`BatchError::Parse`] if the CSV is structurally invalid.
/// * [`BatchError::UnknownColumn`] / [`BatchError::MissingColumn`] for a bad header.
/// * [`BatchError::InvalidFilingStatus`] / [`BatchError::InvalidRow`] for the
///   first bad row.
pub fn load_from_str(input: &str) -> Result<Vec<BatchRow>, BatchError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    let columns = read_columns(reader.headers()?)?;

    reader
        .records()
        .enumerate()
        .map(|(idx, record)| convert_record(&columns, &record?, idx + 1))
        .collect()
}

/// Read a file from disk and delegate to [`load_from_str`].
pub fn load_from_file(path: &Path) -> Result<Vec<BatchRow>, BatchError> {
    let contents = std::fs::read_to_string(path).map_err(|source| BatchError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents)
}
