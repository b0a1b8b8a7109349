//! Progressive rate schedule engine.
//!
//! The same engine drives both schedules. Ordinary income is laid on the
//! schedule starting at zero; preferential income is stacked on top of ordinary
//! income, so its tiers are chosen by the combined total but only the
//! preferential portion is taxed.

use rust_decimal::Decimal;

use crate::TaxBracket;
use crate::TaxBracketSlice;
use crate::calculations::common::{max, round_half_up, sum};

/// Tax owed on one run through a schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleOutcome {
    /// Slices with income in them, lowest rate first.
    pub slices: Vec<TaxBracketSlice>,
    /// Total tax, rounded once. Always equals the sum of `slices[].tax_on_income`.
    pub tax: Decimal,
}

impl ScheduleOutcome {
    fn empty() -> Self {
        Self {
            slices: Vec::new(),
            tax: Decimal::ZERO,
        }
    }
}

/// Taxes `income` on `brackets`, starting from zero.
///
/// `brackets` must be sorted and validated (see [`crate::TaxTables::schedule`]).
pub fn apply_progressive(
    brackets: &[&TaxBracket],
    income: Decimal,
) -> ScheduleOutcome {
    apply_stacked(brackets, Decimal::ZERO, income)
}

/// Taxes `amount` of income that sits on top of `base` income.
///
/// For each bracket the taxed portion is the overlap between the bracket and
/// `[base, base + amount]`. The exact total is rounded once; the cent lost or
/// gained in per-slice rounding is folded into the slice carrying the most tax.
pub fn apply_stacked(
    brackets: &[&TaxBracket],
    base: Decimal,
    amount: Decimal,
) -> ScheduleOutcome {
    if amount <= Decimal::ZERO {
        return ScheduleOutcome::empty();
    }

    let top = base + amount;
    let mut slices = Vec::new();
    let mut exact_tax = Decimal::ZERO;

    for bracket in brackets {
        if bracket.min_income >= top {
            break;
        }

        let lower = max(bracket.min_income, base);
        let upper = bracket.max_income.map_or(top, |max_income| max_income.min(top));
        let income_in_bracket = max(upper - lower, Decimal::ZERO);
        if income_in_bracket.is_zero() {
            continue;
        }

        let slice_tax = income_in_bracket * bracket.tax_rate;
        exact_tax += slice_tax;
        slices.push(TaxBracketSlice {
            rate: bracket.tax_rate,
            income_in_bracket,
            tax_on_income: round_half_up(slice_tax),
        });
    }

    let tax = round_half_up(exact_tax);
    reconcile(&mut slices, tax);

    ScheduleOutcome { slices, tax }
}

/// Pushes any rounding drift into the slice with the most tax so the slices
/// sum exactly to `tax`.
fn reconcile(
    slices: &mut [TaxBracketSlice],
    tax: Decimal,
) {
    let drift = tax - sum(slices.iter().map(|s| s.tax_on_income));
    if drift.is_zero() {
        return;
    }

    if let Some(largest) = slices.iter_mut().max_by_key(|s| s.tax_on_income) {
        largest.tax_on_income += drift;
    }
}
