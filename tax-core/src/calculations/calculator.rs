//! Deterministic federal income tax calculation.
//!
//! # Calculation Flow
//!
//! | Step | Value |
//! |------|-------|
//! | 1    | Total income (sum of income lines) |
//! | 2    | Total above-the-line deductions |
//! | 3    | Adjusted gross income (Step 1 - Step 2, not floored) |
//! | 4    | Standard deduction (filing status + additional amount per senior) |
//! | 5    | Taxable income (Step 3 - Step 4, minimum 0) |
//! | 6    | Preferential income (qualified dividends + long-term gains, capped at Step 5); ordinary is the rest |
//! | 7    | Tax on ordinary income (progressive brackets) |
//! | 8    | Tax on preferential income (0/15/20% tiers, stacked on ordinary income) |
//! | 9    | Initial federal tax (Step 7 + Step 8) |
//! | 10   | Nonrefundable credits (capped at Step 9; the excess is forfeited) |
//! | 11   | Tax after nonrefundable credits (Step 9 - Step 10, minimum 0) |
//! | 12   | Refundable credits (uncapped) |
//! | 13   | Final tax or refund (Step 11 - Step 12, negative means refund) |
//! | 14   | Effective tax rate (Step 13 / Step 1 × 100) |
//! | 15   | Step 9 attributed back to each income line |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::{
//!     FilingStatusCode, IncomeLine, IncomeSource, Situation, StandardDeduction, TaxBracket,
//!     TaxCalculator, TaxTables,
//! };
//!
//! let single = FilingStatusCode::Single;
//! let mut tables = TaxTables::new(2024);
//! tables.ordinary_brackets = vec![
//!     TaxBracket {
//!         filing_status: single,
//!         min_income: dec!(0),
//!         max_income: Some(dec!(11600)),
//!         tax_rate: dec!(0.10),
//!         base_tax: dec!(0),
//!     },
//!     TaxBracket {
//!         filing_status: single,
//!         min_income: dec!(11600),
//!         max_income: None,
//!         tax_rate: dec!(0.12),
//!         base_tax: dec!(1160),
//!     },
//! ];
//! tables.preferential_brackets = vec![TaxBracket {
//!     filing_status: single,
//!     min_income: dec!(0),
//!     max_income: None,
//!     tax_rate: dec!(0),
//!     base_tax: dec!(0),
//! }];
//! tables.standard_deductions = vec![StandardDeduction {
//!     filing_status: single,
//!     amount: dec!(14600),
//!     additional_age_amount: dec!(1950),
//! }];
//!
//! let calculator = TaxCalculator::new(&tables);
//! let breakdown = calculator
//!     .compute_tax(
//!         &Situation::new(single, 30),
//!         &[IncomeLine::new(IncomeSource::Wages, dec!(50000))],
//!         &[],
//!         &[],
//!     )
//!     .unwrap();
//!
//! // 50,000 - 14,600 = 35,400 taxable; 11,600 × 10% + 23,800 × 12%
//! assert_eq!(breakdown.taxable_income, dec!(35400));
//! assert_eq!(breakdown.initial_federal_tax, dec!(4016.00));
//! assert_eq!(breakdown.tax_brackets.len(), 2);
//! ```

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::calculations::attribution::attribute_tax;
use crate::calculations::common::{max, percent_of, round_half_up, sum};
use crate::calculations::schedule::{apply_progressive, apply_stacked};
use crate::{
    ComputationError, CreditLine, DeductionLine, IncomeLine, Refundability, ScheduleKind,
    Situation, TaxBreakdown, TaxCalculatorError, TaxCharacter, TaxInput, TaxTables,
    ValidationError,
};

/// Largest amount accepted on any single line: 1,000,000,000,000,000,000.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_808_348_672, 232_830_643, 0, false, 0);

/// Credit totals after the nonrefundable cap has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AppliedCredits {
    nonrefundable_claimed: Decimal,
    nonrefundable_applied: Decimal,
    nonrefundable_forfeited: Decimal,
    refundable: Decimal,
}

/// Calculator for a federal income tax breakdown.
///
/// Holds nothing but a borrow of the rate tables, so one calculator can be
/// shared and re-called freely; every call is independent of the last.
#[derive(Debug, Clone, Copy)]
pub struct TaxCalculator<'a> {
    tables: &'a TaxTables,
}

impl<'a> TaxCalculator<'a> {
    pub fn new(tables: &'a TaxTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &'a TaxTables {
        self.tables
    }

    /// Convenience wrapper over [`TaxCalculator::compute_tax`] for a bundled input.
    pub fn compute(
        &self,
        input: &TaxInput,
    ) -> Result<TaxBreakdown, TaxCalculatorError> {
        self.compute_tax(
            &input.situation,
            &input.income,
            &input.deductions,
            &input.credits,
        )
    }

    /// Computes the complete breakdown.
    ///
    /// Either the whole breakdown is produced or nothing is.
    ///
    /// # Errors
    ///
    /// - [`ValidationError`] if an age or amount is negative, or a joint return
    ///   has no spouse age. No computation is attempted.
    /// - [`ComputationError`] if the tables for the filing status are missing
    ///   or malformed.
    pub fn compute_tax(
        &self,
        situation: &Situation,
        income: &[IncomeLine],
        deductions: &[DeductionLine],
        credits: &[CreditLine],
    ) -> Result<TaxBreakdown, TaxCalculatorError> {
        self.validate(situation, income, deductions, credits)?;

        let income = normalize_income(income);
        let deductions = normalize_deductions(deductions);
        let credits = normalize_credits(credits);
        let status = situation.filing_status;

        let ordinary_schedule = self.tables.schedule(ScheduleKind::Ordinary, status)?;
        let preferential_schedule = self.tables.schedule(ScheduleKind::Preferential, status)?;

        // Steps 1-3
        let total_income = sum(income.iter().map(|line| line.amount));
        let total_deductions = sum(deductions.iter().map(|line| line.amount));
        let adjusted_gross_income = total_income - total_deductions;

        // Steps 4-5
        let standard_deduction = self.standard_deduction(situation, total_income)?;
        let taxable_income = self.taxable_income(adjusted_gross_income, standard_deduction);

        // Step 6
        let (taxable_ordinary_income, taxable_preferential_income) =
            self.split_taxable_income(taxable_income, &income);

        // Steps 7-9
        let ordinary = apply_progressive(&ordinary_schedule, taxable_ordinary_income);
        let preferential = apply_stacked(
            &preferential_schedule,
            taxable_ordinary_income,
            taxable_preferential_income,
        );
        let initial_federal_tax = ordinary.tax + preferential.tax;

        // Steps 10-13
        let applied = self.apply_credits(&credits, initial_federal_tax);
        let tax_after_nonrefundable_credits = max(
            initial_federal_tax - applied.nonrefundable_applied,
            Decimal::ZERO,
        );
        let final_tax_or_refund = tax_after_nonrefundable_credits - applied.refundable;

        // Step 14
        let effective_tax_rate = percent_of(final_tax_or_refund, total_income);

        // Step 15
        let income_tax_details = attribute_tax(&income, ordinary.tax, preferential.tax)?;

        debug!(
            tax_year = self.tables.tax_year,
            filing_status = status.as_str(),
            %total_income,
            %adjusted_gross_income,
            %taxable_income,
            %initial_federal_tax,
            %final_tax_or_refund,
            "tax computed"
        );

        Ok(TaxBreakdown {
            tax_year: self.tables.tax_year,
            total_income,
            total_above_the_line_deductions: total_deductions,
            adjusted_gross_income,
            standard_deduction,
            taxable_income,
            initial_federal_tax,
            nonrefundable_credits_claimed: applied.nonrefundable_claimed,
            total_nonrefundable_credits: applied.nonrefundable_applied,
            nonrefundable_credits_forfeited: applied.nonrefundable_forfeited,
            tax_after_nonrefundable_credits,
            total_refundable_credits: applied.refundable,
            final_tax_or_refund,
            taxable_ordinary_income,
            taxable_preferential_income,
            tax_on_ordinary_income: ordinary.tax,
            tax_on_preferential_income: preferential.tax,
            effective_tax_rate,
            tax_brackets: ordinary.slices,
            preferential_tiers: preferential.slices,
            income_tax_details,
        })
    }

    /// Rejects input the calculation cannot be run on.
    fn validate(
        &self,
        situation: &Situation,
        income: &[IncomeLine],
        deductions: &[DeductionLine],
        credits: &[CreditLine],
    ) -> Result<(), ValidationError> {
        if situation.age < 0 {
            return Err(ValidationError::NegativeAge(situation.age));
        }

        match situation.spouse_age {
            Some(age) if age < 0 => return Err(ValidationError::NegativeSpouseAge(age)),
            None if situation.filing_status.requires_spouse_age() => {
                return Err(ValidationError::MissingSpouseAge(situation.filing_status));
            }
            Some(age) if !situation.filing_status.requires_spouse_age() => {
                warn!(
                    spouse_age = age,
                    filing_status = situation.filing_status.as_str(),
                    "Spouse age ignored for this filing status"
                );
            }
            _ => {}
        }

        let amounts = income
            .iter()
            .map(|line| (line.source.key(), line.amount))
            .chain(deductions.iter().map(|line| (line.kind.key(), line.amount)))
            .chain(credits.iter().map(|line| (line.kind.key(), line.amount)));

        for (item, amount) in amounts {
            if amount < Decimal::ZERO {
                return Err(ValidationError::NegativeAmount { item, amount });
            }
            if amount > MAX_AMOUNT {
                return Err(ValidationError::AmountTooLarge {
                    item,
                    amount,
                    max: MAX_AMOUNT,
                });
            }
        }

        Ok(())
    }

    /// Standard deduction for the filing status plus the additional amount for
    /// each counted taxpayer at or above the senior age (Step 4).
    ///
    /// With no income at all there is nothing to offset and the deduction is
    /// reported as zero.
    fn standard_deduction(
        &self,
        situation: &Situation,
        total_income: Decimal,
    ) -> Result<Decimal, ComputationError> {
        let entry = self.tables.standard_deduction(situation.filing_status)?;

        if total_income.is_zero() {
            return Ok(Decimal::ZERO);
        }

        let seniors = situation
            .counted_ages()
            .filter(|&age| age >= self.tables.senior_age)
            .count();

        let deduction = entry.amount + entry.additional_age_amount * Decimal::from(seniors);
        debug!(
            base = %entry.amount,
            seniors,
            deduction = %deduction,
            "standard deduction determined"
        );
        Ok(round_half_up(deduction))
    }

    /// Calculates taxable income (Step 5).
    fn taxable_income(
        &self,
        adjusted_gross_income: Decimal,
        standard_deduction: Decimal,
    ) -> Decimal {
        max(adjusted_gross_income - standard_deduction, Decimal::ZERO)
    }

    /// Splits taxable income into its ordinary and preferential parts (Step 6).
    ///
    /// Preferential income is taxed last, so deductions are absorbed by
    /// ordinary income first.
    fn split_taxable_income(
        &self,
        taxable_income: Decimal,
        income: &[IncomeLine],
    ) -> (Decimal, Decimal) {
        let preferential_income = sum(
            income
                .iter()
                .filter(|line| line.tax_character() == TaxCharacter::Preferential)
                .map(|line| line.amount),
        );
        let taxable_preferential = preferential_income.min(taxable_income);

        (taxable_income - taxable_preferential, taxable_preferential)
    }

    /// Totals the credits and caps the nonrefundable ones (Steps 10 and 12).
    ///
    /// Nonrefundable value above the initial tax is dropped. Nothing is carried
    /// forward to a later year.
    fn apply_credits(
        &self,
        credits: &[CreditLine],
        initial_federal_tax: Decimal,
    ) -> AppliedCredits {
        let total = |refundability: Refundability| {
            sum(credits
                .iter()
                .filter(|line| line.refundability() == refundability)
                .map(|line| line.amount))
        };

        let nonrefundable_claimed = total(Refundability::Nonrefundable);
        let nonrefundable_applied = nonrefundable_claimed.min(initial_federal_tax);
        let nonrefundable_forfeited = nonrefundable_claimed - nonrefundable_applied;

        if nonrefundable_forfeited > Decimal::ZERO {
            warn!(
                claimed = %nonrefundable_claimed,
                initial_federal_tax = %initial_federal_tax,
                forfeited = %nonrefundable_forfeited,
                "Nonrefundable credits exceed tax; excess is forfeited"
            );
        }

        AppliedCredits {
            nonrefundable_claimed,
            nonrefundable_applied,
            nonrefundable_forfeited,
            refundable: total(Refundability::Refundable),
        }
    }
}

fn normalize_income(lines: &[IncomeLine]) -> Vec<IncomeLine> {
    lines
        .iter()
        .map(|line| IncomeLine::new(line.source, round_half_up(line.amount)))
        .collect()
}

fn normalize_deductions(lines: &[DeductionLine]) -> Vec<DeductionLine> {
    lines
        .iter()
        .map(|line| DeductionLine::new(line.kind, round_half_up(line.amount)))
        .collect()
}

fn normalize_credits(lines: &[CreditLine]) -> Vec<CreditLine> {
    lines
        .iter()
        .map(|line| CreditLine::new(line.kind, round_half_up(line.amount)))
        .collect()
}
