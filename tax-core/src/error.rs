use rust_decimal::Decimal;
use thiserror::Error;

use crate::{FilingStatusCode, ScheduleKind, TaxCharacter};

/// Input that cannot be calculated. Reported before any computation starts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("age must be non-negative, got {0}")]
    NegativeAge(i32),

    #[error("spouse age must be non-negative, got {0}")]
    NegativeSpouseAge(i32),

    #[error("filing status '{0}' requires a spouse age")]
    MissingSpouseAge(FilingStatusCode),

    #[error("amount for '{item}' must be non-negative, got {amount}")]
    NegativeAmount { item: &'static str, amount: Decimal },

    #[error("amount for '{item}' must not exceed {max}, got {amount}")]
    AmountTooLarge {
        item: &'static str,
        amount: Decimal,
        max: Decimal,
    },
}

/// An internal invariant was broken, almost always by a misconfigured table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComputationError {
    #[error("no {schedule} brackets configured for {filing_status}")]
    NoBrackets {
        schedule: ScheduleKind,
        filing_status: FilingStatusCode,
    },

    #[error("{schedule} schedule for {filing_status} must start at 0, starts at {min_income}")]
    ScheduleDoesNotStartAtZero {
        schedule: ScheduleKind,
        filing_status: FilingStatusCode,
        min_income: Decimal,
    },

    #[error(
        "{schedule} schedule for {filing_status} has a gap: expected a bracket at {expected}, found {found}"
    )]
    BracketGap {
        schedule: ScheduleKind,
        filing_status: FilingStatusCode,
        expected: Decimal,
        found: Decimal,
    },

    #[error("{schedule} bracket for {filing_status} at {min_income} has no width")]
    EmptyBracket {
        schedule: ScheduleKind,
        filing_status: FilingStatusCode,
        min_income: Decimal,
    },

    #[error("{schedule} schedule for {filing_status} has an open-ended bracket that is not last")]
    UnboundedBracketNotLast {
        schedule: ScheduleKind,
        filing_status: FilingStatusCode,
    },

    #[error("{schedule} schedule for {filing_status} does not end with an open-ended bracket")]
    TopBracketBounded {
        schedule: ScheduleKind,
        filing_status: FilingStatusCode,
    },

    #[error("{schedule} rate for {filing_status} must be between 0 and 1, got {rate}")]
    InvalidRate {
        schedule: ScheduleKind,
        filing_status: FilingStatusCode,
        rate: Decimal,
    },

    #[error("{schedule} rates for {filing_status} must not decrease, {rate} follows {previous}")]
    RatesNotProgressive {
        schedule: ScheduleKind,
        filing_status: FilingStatusCode,
        previous: Decimal,
        rate: Decimal,
    },

    #[error(
        "{schedule} bracket for {filing_status} at {min_income} has base tax {found}, expected {expected}"
    )]
    BaseTaxMismatch {
        schedule: ScheduleKind,
        filing_status: FilingStatusCode,
        min_income: Decimal,
        expected: Decimal,
        found: Decimal,
    },

    #[error("no standard deduction configured for {0}")]
    MissingStandardDeduction(FilingStatusCode),

    #[error("standard deduction for {filing_status} must be non-negative, got {amount}")]
    InvalidStandardDeduction {
        filing_status: FilingStatusCode,
        amount: Decimal,
    },

    #[error("{character} tax of {tax} has no income lines to attribute it to")]
    UnattributableTax { character: TaxCharacter, tax: Decimal },
}

/// Everything `TaxCalculator::compute_tax` can fail with.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaxCalculatorError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("calculation failed: {0}")]
    Computation(#[from] ComputationError),
}
