use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::round_half_up;
use crate::{ComputationError, FilingStatusCode, ScheduleKind, StandardDeduction, TaxBracket};

/// Every rate, threshold, and deduction amount for one tax year.
///
/// Nothing in the calculator hard-codes law; it reads these tables. Brackets for
/// all filing statuses share one vector and are selected by `filing_status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxTables {
    pub tax_year: i32,

    /// Age at which a taxpayer receives the additional standard deduction.
    pub senior_age: i32,

    pub ordinary_brackets: Vec<TaxBracket>,
    pub preferential_brackets: Vec<TaxBracket>,
    pub standard_deductions: Vec<StandardDeduction>,
}

impl TaxTables {
    pub const DEFAULT_SENIOR_AGE: i32 = 65;

    /// Creates empty tables for `tax_year`.
    pub fn new(tax_year: i32) -> Self {
        Self {
            tax_year,
            senior_age: Self::DEFAULT_SENIOR_AGE,
            ordinary_brackets: Vec::new(),
            preferential_brackets: Vec::new(),
            standard_deductions: Vec::new(),
        }
    }

    /// Returns the validated schedule of `kind` for `filing_status`, ordered by
    /// `min_income`.
    ///
    /// # Errors
    ///
    /// Returns [`ComputationError`] if the schedule is missing or malformed.
    pub fn schedule(
        &self,
        kind: ScheduleKind,
        filing_status: FilingStatusCode,
    ) -> Result<Vec<&TaxBracket>, ComputationError> {
        let source = match kind {
            ScheduleKind::Ordinary => &self.ordinary_brackets,
            ScheduleKind::Preferential => &self.preferential_brackets,
        };

        let mut brackets: Vec<&TaxBracket> = source
            .iter()
            .filter(|b| b.filing_status == filing_status)
            .collect();
        brackets.sort_by(|a, b| a.min_income.cmp(&b.min_income));

        validate_schedule(kind, filing_status, &brackets)?;
        Ok(brackets)
    }

    pub fn standard_deduction(
        &self,
        filing_status: FilingStatusCode,
    ) -> Result<&StandardDeduction, ComputationError> {
        let deduction = self
            .standard_deductions
            .iter()
            .find(|d| d.filing_status == filing_status)
            .ok_or(ComputationError::MissingStandardDeduction(filing_status))?;

        for amount in [deduction.amount, deduction.additional_age_amount] {
            if amount < Decimal::ZERO {
                return Err(ComputationError::InvalidStandardDeduction {
                    filing_status,
                    amount,
                });
            }
        }

        Ok(deduction)
    }

    /// Checks every schedule and deduction for every filing status.
    pub fn validate(&self) -> Result<(), ComputationError> {
        for status in FilingStatusCode::ALL {
            self.schedule(ScheduleKind::Ordinary, status)?;
            self.schedule(ScheduleKind::Preferential, status)?;
            self.standard_deduction(status)?;
        }
        Ok(())
    }
}

/// Checks that a sorted schedule covers `[0, ∞)` without gaps, that rates
/// never decrease, and that each `base_tax` equals the tax on the brackets below.
fn validate_schedule(
    schedule: ScheduleKind,
    filing_status: FilingStatusCode,
    brackets: &[&TaxBracket],
) -> Result<(), ComputationError> {
    let Some(first) = brackets.first() else {
        return Err(ComputationError::NoBrackets {
            schedule,
            filing_status,
        });
    };
    if first.min_income != Decimal::ZERO {
        return Err(ComputationError::ScheduleDoesNotStartAtZero {
            schedule,
            filing_status,
            min_income: first.min_income,
        });
    }

    let mut expected_min = Decimal::ZERO;
    let mut cumulative_tax = Decimal::ZERO;
    let mut previous_rate: Option<Decimal> = None;

    for (index, bracket) in brackets.iter().enumerate() {
        if bracket.tax_rate < Decimal::ZERO || bracket.tax_rate > Decimal::ONE {
            return Err(ComputationError::InvalidRate {
                schedule,
                filing_status,
                rate: bracket.tax_rate,
            });
        }
        if let Some(previous) = previous_rate.filter(|previous| bracket.tax_rate < *previous) {
            return Err(ComputationError::RatesNotProgressive {
                schedule,
                filing_status,
                previous,
                rate: bracket.tax_rate,
            });
        }
        if bracket.min_income != expected_min {
            return Err(ComputationError::BracketGap {
                schedule,
                filing_status,
                expected: expected_min,
                found: bracket.min_income,
            });
        }
        if round_half_up(cumulative_tax) != bracket.base_tax {
            return Err(ComputationError::BaseTaxMismatch {
                schedule,
                filing_status,
                min_income: bracket.min_income,
                expected: round_half_up(cumulative_tax),
                found: bracket.base_tax,
            });
        }

        let is_last = index + 1 == brackets.len();
        match bracket.width() {
            Some(width) if width <= Decimal::ZERO => {
                return Err(ComputationError::EmptyBracket {
                    schedule,
                    filing_status,
                    min_income: bracket.min_income,
                });
            }
            Some(_) if is_last => {
                return Err(ComputationError::TopBracketBounded {
                    schedule,
                    filing_status,
                });
            }
            Some(width) => {
                cumulative_tax += width * bracket.tax_rate;
                expected_min = bracket.min_income + width;
            }
            None if !is_last => {
                return Err(ComputationError::UnboundedBracketNotLast {
                    schedule,
                    filing_status,
                });
            }
            None => {}
        }

        previous_rate = Some(bracket.tax_rate);
    }

    Ok(())
}
