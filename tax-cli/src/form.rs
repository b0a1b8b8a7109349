//! Raw form state and its conversion into calculator input.
//!
//! Every field is kept as the string the user typed so that a bad entry can be
//! shown back unchanged. [`TaxForm::collect`] parses everything at once and
//! reports every bad field, not just the first.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use tax_core::{
    CreditKind, CreditLine, DeductionKind, DeductionLine, FilingStatusCode, IncomeLine,
    IncomeSource, Situation, TaxInput,
};
use thiserror::Error;

use crate::utils::{parse_age, parse_decimal};

/// A form field that could not be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every field error found by one [`TaxForm::collect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormErrors(pub Vec<FieldError>);

impl std::error::Error for FormErrors {}

impl fmt::Display for FormErrors {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxForm {
    pub filing_status: FilingStatusCode,
    pub age: String,
    pub spouse_age: String,
    pub income: BTreeMap<IncomeSource, String>,
    pub deductions: BTreeMap<DeductionKind, String>,
    pub credits: BTreeMap<CreditKind, String>,
}

impl Default for TaxForm {
    fn default() -> Self {
        Self {
            filing_status: FilingStatusCode::Single,
            age: String::new(),
            spouse_age: String::new(),
            income: BTreeMap::new(),
            deductions: BTreeMap::new(),
            credits: BTreeMap::new(),
        }
    }
}

impl TaxForm {
    /// The primary taxpayer's age as entered.
    pub fn age(&self) -> Result<i32, FieldError> {
        parse_age(&self.age).map_err(|e| FieldError::new("age", e.to_string()))
    }

    /// Sum of the income fields that currently parse; bad fields count as zero.
    pub fn income_total(&self) -> Decimal {
        self.income
            .values()
            .filter_map(|raw| parse_decimal(raw).ok())
            .sum()
    }

    /// Parses the form into calculator input.
    ///
    /// Empty fields are zero and zero amounts are left out. The spouse's age is
    /// only read on a joint return.
    pub fn collect(&self) -> Result<TaxInput, FormErrors> {
        let mut errors = Vec::new();

        let age = self.age().unwrap_or_else(|e| {
            errors.push(e);
            0
        });
        let mut situation = Situation::new(self.filing_status, age);
        if self.filing_status.requires_spouse_age() {
            match parse_age(&self.spouse_age) {
                Ok(spouse_age) => situation = situation.with_spouse_age(spouse_age),
                Err(e) => errors.push(FieldError::new("spouseAge", e.to_string())),
            }
        }

        let mut input = TaxInput::new(situation);
        input.income = parse_lines(&self.income, IncomeSource::key, &mut errors)
            .map(|(source, amount)| IncomeLine::new(source, amount))
            .collect();
        input.deductions = parse_lines(&self.deductions, DeductionKind::key, &mut errors)
            .map(|(kind, amount)| DeductionLine::new(kind, amount))
            .collect();
        input.credits = parse_lines(&self.credits, CreditKind::key, &mut errors)
            .map(|(kind, amount)| CreditLine::new(kind, amount))
            .collect();

        if errors.is_empty() {
            Ok(input)
        } else {
            Err(FormErrors(errors))
        }
    }
}

fn parse_lines<'a, K: Copy>(
    fields: &'a BTreeMap<K, String>,
    key: fn(&K) -> &'static str,
    errors: &'a mut Vec<FieldError>,
) -> impl Iterator<Item = (K, Decimal)> + 'a {
    fields.iter().filter_map(move |(k, raw)| match parse_decimal(raw) {
        Ok(amount) if amount.is_zero() => None,
        Ok(amount) => Some((*k, amount)),
        Err(e) => {
            errors.push(FieldError::new(key(k), e.to_string()));
            None
        }
    })
}
