//! Attribution of the initial federal tax back to the income lines it came from.

use rust_decimal::Decimal;

use crate::calculations::common::{round_half_up, sum};
use crate::{ComputationError, IncomeLine, IncomeTaxDetail, TaxCharacter};

/// Splits each character's tax across the non-zero lines of that character in
/// proportion to their amounts.
///
/// Ordinary lines share `tax_on_ordinary`, preferential lines share
/// `tax_on_preferential`. Within each bucket the largest line absorbs the
/// rounding remainder (the last one on ties), so the details always sum to
/// exactly `tax_on_ordinary + tax_on_preferential`.
///
/// # Errors
///
/// Returns [`ComputationError::UnattributableTax`] if a bucket carries tax but
/// has no income lines.
pub fn attribute_tax(
    income: &[IncomeLine],
    tax_on_ordinary: Decimal,
    tax_on_preferential: Decimal,
) -> Result<Vec<IncomeTaxDetail>, ComputationError> {
    let mut details: Vec<IncomeTaxDetail> = income
        .iter()
        .filter(|line| !line.amount.is_zero())
        .map(|line| IncomeTaxDetail {
            source: line.source,
            amount: line.amount,
            estimated_tax: Decimal::ZERO,
            tax_character: line.tax_character(),
        })
        .collect();

    share_bucket(&mut details, TaxCharacter::Ordinary, tax_on_ordinary)?;
    share_bucket(&mut details, TaxCharacter::Preferential, tax_on_preferential)?;

    Ok(details)
}

fn share_bucket(
    details: &mut [IncomeTaxDetail],
    character: TaxCharacter,
    tax: Decimal,
) -> Result<(), ComputationError> {
    let bucket: Vec<usize> = details
        .iter()
        .enumerate()
        .filter(|(_, d)| d.tax_character == character)
        .map(|(index, _)| index)
        .collect();

    let bucket_amount = sum(bucket.iter().map(|&i| details[i].amount));
    if bucket_amount.is_zero() {
        if tax.is_zero() {
            return Ok(());
        }
        return Err(ComputationError::UnattributableTax { character, tax });
    }

    for &index in &bucket {
        let detail = &mut details[index];
        detail.estimated_tax = round_half_up(share_of(tax, detail.amount, bucket_amount));
    }

    let remainder = tax - sum(bucket.iter().map(|&i| details[i].estimated_tax));
    if let Some(&largest) = bucket.iter().max_by_key(|&&i| details[i].amount) {
        details[largest].estimated_tax += remainder;
    }

    Ok(())
}

/// `tax * amount / bucket_amount`, dividing first when the product would not
/// fit in a [`Decimal`].
fn share_of(
    tax: Decimal,
    amount: Decimal,
    bucket_amount: Decimal,
) -> Decimal {
    match tax.checked_mul(amount) {
        Some(product) => product / bucket_amount,
        None => tax * (amount / bucket_amount),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::IncomeSource;

    fn total(details: &[IncomeTaxDetail]) -> Decimal {
        sum(details.iter().map(|d| d.estimated_tax))
    }

    #[test]
    fn single_line_takes_the_whole_bucket() {
        let income = [IncomeLine::new(IncomeSource::Wages, dec!(50000))];

        let details = attribute_tax(&income, dec!(4016), Decimal::ZERO).unwrap();

        assert_eq!(details.len(), 1);
        assert_eq!(details[0].estimated_tax, dec!(4016));
        assert_eq!(details[0].tax_character, TaxCharacter::Ordinary);
    }

    #[test]
    fn zero_lines_are_skipped() {
        let income = [
            IncomeLine::new(IncomeSource::Wages, dec!(50000)),
            IncomeLine::new(IncomeSource::Tips, Decimal::ZERO),
        ];

        let details = attribute_tax(&income, dec!(100), Decimal::ZERO).unwrap();

        assert_eq!(details.len(), 1);
        assert_eq!(details[0].source, IncomeSource::Wages);
    }

    #[test]
    fn buckets_are_shared_by_character() {
        let income = [
            IncomeLine::new(IncomeSource::Wages, dec!(30000)),
            IncomeLine::new(IncomeSource::Interest, dec!(10000)),
            IncomeLine::new(IncomeSource::LongTermCapitalGains, dec!(5000)),
        ];

        let details = attribute_tax(&income, dec!(4000), dec!(750)).unwrap();

        assert_eq!(details[0].estimated_tax, dec!(3000));
        assert_eq!(details[1].estimated_tax, dec!(1000));
        assert_eq!(details[2].estimated_tax, dec!(750));
    }

    #[test]
    fn rounding_remainder_goes_to_largest_line() {
        let income = [
            IncomeLine::new(IncomeSource::Wages, dec!(100)),
            IncomeLine::new(IncomeSource::Tips, dec!(100)),
            IncomeLine::new(IncomeSource::Interest, dec!(100)),
        ];

        // 100 / 3 = 33.333… for each; the last of the equal lines gets the cent.
        let details = attribute_tax(&income, dec!(100), Decimal::ZERO).unwrap();

        assert_eq!(details[0].estimated_tax, dec!(33.33));
        assert_eq!(details[1].estimated_tax, dec!(33.33));
        assert_eq!(details[2].estimated_tax, dec!(33.34));
        assert_eq!(total(&details), dec!(100));
    }

    #[test]
    fn tax_without_lines_is_a_computation_error() {
        let income = [IncomeLine::new(IncomeSource::Wages, dec!(100))];

        let result = attribute_tax(&income, Decimal::ZERO, dec!(15));

        assert_eq!(
            result,
            Err(ComputationError::UnattributableTax {
                character: TaxCharacter::Preferential,
                tax: dec!(15),
            })
        );
    }

    #[test]
    fn huge_buckets_share_without_overflow() {
        let income = [
            IncomeLine::new(IncomeSource::Wages, dec!(100000000000000000000)),
            IncomeLine::new(IncomeSource::Tips, dec!(1)),
        ];
        let tax = dec!(37000000000000000000);

        let details = attribute_tax(&income, tax, Decimal::ZERO).unwrap();

        assert_eq!(details[1].estimated_tax, dec!(0.37));
        assert_eq!(total(&details), tax);
    }
}
