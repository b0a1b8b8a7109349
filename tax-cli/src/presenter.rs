//! Plain-text rendering of a calculation outcome.

use std::fmt;

use rust_decimal::Decimal;
use tax_core::calculations::common::round_half_up;
use tax_core::{TaxBracketSlice, TaxBreakdown};

/// What the results view has to show.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CalculationState {
    #[default]
    NotComputed,
    Failed(String),
    Computed(TaxBreakdown),
}

impl CalculationState {
    pub fn breakdown(&self) -> Option<&TaxBreakdown> {
        match self {
            Self::Computed(breakdown) => Some(breakdown),
            _ => None,
        }
    }
}

/// Formats an amount as US dollars, e.g. `-$1,234.56`.
pub fn format_currency(value: Decimal) -> String {
    let text = format!("{:.2}", round_half_up(value.abs()));
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < Decimal::ZERO { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

/// Formats a fractional rate as a whole percentage, e.g. `0.12` as `12%`.
pub fn format_rate(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}

/// One line per breakdown, for batch output.
pub fn summary_line(breakdown: &TaxBreakdown) -> String {
    let outcome = if breakdown.is_refund() {
        "refund"
    } else {
        "tax due"
    };
    format!(
        "AGI {}, taxable {}, {} {}, effective rate {}%",
        format_currency(breakdown.adjusted_gross_income),
        format_currency(breakdown.taxable_income),
        outcome,
        format_currency(breakdown.final_tax_or_refund.abs()),
        breakdown.effective_tax_rate,
    )
}

fn row(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    value: Decimal,
) -> fmt::Result {
    writeln!(f, "  {:<34}{:>18}", label, format_currency(value))
}

fn subtracted_row(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    value: Decimal,
) -> fmt::Result {
    writeln!(f, "  {:<34}{:>18}", label, format!("- {}", format_currency(value)))
}

fn slice_table(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    slices: &[TaxBracketSlice],
) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{title}")?;
    writeln!(f, "  {:<8}{:>22}{:>18}", "Rate", "Income in Bracket", "Tax")?;
    for slice in slices {
        writeln!(
            f,
            "  {:<8}{:>22}{:>18}",
            format_rate(slice.rate),
            format_currency(slice.income_in_bracket),
            format_currency(slice.tax_on_income)
        )?;
    }
    Ok(())
}

fn render_breakdown(
    f: &mut fmt::Formatter<'_>,
    b: &TaxBreakdown,
) -> fmt::Result {
    writeln!(f, "Federal Tax Estimate ({})", b.tax_year)?;
    writeln!(f)?;
    writeln!(f, "Calculation Summary")?;
    row(f, "Total Gross Income", b.total_income)?;
    subtracted_row(f, "Above-the-Line Deductions", b.total_above_the_line_deductions)?;
    row(f, "Adjusted Gross Income (AGI)", b.adjusted_gross_income)?;
    subtracted_row(f, "Standard Deduction", b.standard_deduction)?;
    row(f, "Taxable Income", b.taxable_income)?;
    row(f, "Initial Federal Tax", b.initial_federal_tax)?;
    subtracted_row(f, "Nonrefundable Credits", b.total_nonrefundable_credits)?;
    if b.nonrefundable_credits_forfeited > Decimal::ZERO {
        row(f, "  (unused, not carried forward)", b.nonrefundable_credits_forfeited)?;
    }
    row(f, "Tax after Nonrefundable Credits", b.tax_after_nonrefundable_credits)?;
    subtracted_row(f, "Refundable Credits", b.total_refundable_credits)?;

    writeln!(f)?;
    let label = if b.is_refund() {
        "Estimated Refund"
    } else {
        "Estimated Tax Due"
    };
    row(f, label, b.final_tax_or_refund.abs())?;
    writeln!(f, "  {:<34}{:>18}", "Effective Tax Rate", format!("{}%", b.effective_tax_rate))?;

    slice_table(f, "Ordinary Income Tax Brackets", &b.tax_brackets)?;
    if !b.preferential_tiers.is_empty() {
        slice_table(f, "Capital Gains & Qualified Dividend Tiers", &b.preferential_tiers)?;
    }

    if !b.income_tax_details.is_empty() {
        writeln!(f)?;
        writeln!(f, "Tax by Income Source (Pre-Credits)")?;
        writeln!(
            f,
            "  {:<28}{:<14}{:>18}{:>18}",
            "Source", "Tax Type", "Amount", "Estimated Tax"
        )?;
        for detail in &b.income_tax_details {
            writeln!(
                f,
                "  {:<28}{:<14}{:>18}{:>18}",
                detail.source.label(),
                detail.tax_character.to_string(),
                format_currency(detail.amount),
                format_currency(detail.estimated_tax)
            )?;
        }
    }
    Ok(())
}

impl fmt::Display for CalculationState {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::NotComputed => {
                writeln!(f, "Awaiting Calculation")?;
                writeln!(f, "Run 'calc' to see your federal tax estimate.")
            }
            Self::Failed(message) => {
                writeln!(f, "Calculation Error")?;
                writeln!(f, "{message}")
            }
            Self::Computed(breakdown) => render_breakdown(f, breakdown),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(dec!(1234567.891)), "$1,234,567.89");
        assert_eq!(format_currency(dec!(999)), "$999.00");
        assert_eq!(format_currency(dec!(1000)), "$1,000.00");
        assert_eq!(format_currency(Decimal::ZERO), "$0.00");
    }

    #[test]
    fn currency_puts_sign_before_symbol() {
        assert_eq!(format_currency(dec!(-600)), "-$600.00");
    }

    #[test]
    fn rate_is_a_whole_percentage() {
        assert_eq!(format_rate(dec!(0.12)), "12%");
        assert_eq!(format_rate(dec!(0)), "0%");
        assert_eq!(format_rate(dec!(0.375)), "37.5%");
    }

    #[test]
    fn not_computed_state_prompts_for_calculation() {
        let text = CalculationState::NotComputed.to_string();

        assert!(text.starts_with("Awaiting Calculation"));
    }

    #[test]
    fn failed_state_shows_message() {
        let text = CalculationState::Failed("Please enter a valid age.".to_string()).to_string();

        assert_eq!(text, "Calculation Error\nPlease enter a valid age.\n");
    }
}
