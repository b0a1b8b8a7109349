use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{IncomeSource, TaxCharacter};

/// Income taxed at one marginal rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBracketSlice {
    pub rate: Decimal,
    pub income_in_bracket: Decimal,
    pub tax_on_income: Decimal,
}

/// The share of the initial federal tax that originates from one income line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeTaxDetail {
    #[serde(
        rename = "sourceName",
        serialize_with = "serialize_source",
        deserialize_with = "deserialize_source"
    )]
    pub source: IncomeSource,
    pub amount: Decimal,
    pub estimated_tax: Decimal,
    #[serde(rename = "taxType")]
    pub tax_character: TaxCharacter,
}

fn serialize_source<S>(
    source: &IncomeSource,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(source.key())
}

/// Accepts either the catalog key or the display label, since breakdowns
/// produced outside this crate name sources either way.
fn deserialize_source<'de, D>(deserializer: D) -> Result<IncomeSource, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    IncomeSource::parse(&s)
        .ok_or_else(|| serde::de::Error::custom(format!("unknown income source '{s}'")))
}

/// The complete result of one calculation.
///
/// Field names serialize in camelCase. Money, rates and percentages serialize
/// as decimal strings (`"4016.00"`) so no precision is lost; on the way in,
/// JSON numbers are accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBreakdown {
    #[serde(default)]
    pub tax_year: i32,

    // Calculation flow
    pub total_income: Decimal,
    pub total_above_the_line_deductions: Decimal,
    pub adjusted_gross_income: Decimal,
    pub standard_deduction: Decimal,
    pub taxable_income: Decimal,

    // Tax calculation
    pub initial_federal_tax: Decimal,
    #[serde(default)]
    pub nonrefundable_credits_claimed: Decimal,
    pub total_nonrefundable_credits: Decimal,
    /// Nonrefundable credit value above the initial tax. Dropped, not carried forward.
    #[serde(default)]
    pub nonrefundable_credits_forfeited: Decimal,
    pub tax_after_nonrefundable_credits: Decimal,
    pub total_refundable_credits: Decimal,
    /// Positive when tax is due, negative for a refund.
    pub final_tax_or_refund: Decimal,

    // Breakdowns
    pub taxable_ordinary_income: Decimal,
    pub taxable_preferential_income: Decimal,
    pub tax_on_ordinary_income: Decimal,
    pub tax_on_preferential_income: Decimal,
    pub effective_tax_rate: Decimal,
    pub tax_brackets: Vec<TaxBracketSlice>,
    #[serde(default)]
    pub preferential_tiers: Vec<TaxBracketSlice>,
    pub income_tax_details: Vec<IncomeTaxDetail>,
}

impl TaxBreakdown {
    pub fn is_refund(&self) -> bool {
        self.final_tax_or_refund < Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::{Value, json};

    use super::*;

    #[test]
    fn money_is_read_from_numbers_and_written_as_strings() {
        let slice: TaxBracketSlice = serde_json::from_value(json!({
            "rate": 0.12,
            "incomeInBracket": 23800,
            "taxOnIncome": "2856.00"
        }))
        .unwrap();

        assert_eq!(slice.rate, dec!(0.12));
        assert_eq!(slice.income_in_bracket, dec!(23800));

        let written = serde_json::to_value(&slice).unwrap();
        assert_eq!(written["rate"], Value::String("0.12".to_string()));
        assert_eq!(written["incomeInBracket"], Value::String("23800".to_string()));
        assert_eq!(written["taxOnIncome"], Value::String("2856.00".to_string()));
    }

    #[test]
    fn detail_source_is_written_as_key_and_read_from_label() {
        let detail: IncomeTaxDetail = serde_json::from_value(json!({
            "sourceName": "Wages, Salaries",
            "amount": 50000,
            "estimatedTax": 4016,
            "taxType": "Ordinary"
        }))
        .unwrap();

        assert_eq!(detail.source, IncomeSource::Wages);
        assert_eq!(serde_json::to_value(&detail).unwrap()["sourceName"], "wages");
    }
}
