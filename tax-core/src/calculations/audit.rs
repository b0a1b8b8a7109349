//! Checks for breakdowns that did not come from [`crate::TaxCalculator`].
//!
//! An estimate produced elsewhere (an assistant, an older service, a hand-filled
//! JSON file) is only shown once it passes [`audit_breakdown`], and
//! [`compare_breakdowns`] lists every way it departs from the deterministic
//! result. Both allow one cent of slack per comparison.

use std::fmt;

use rust_decimal::Decimal;

use crate::calculations::common::{max, percent_of, sum};
use crate::{TaxBracketSlice, TaxBreakdown};

/// One cent.
const TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// One problem found in a breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditFinding {
    /// A field that can never be negative is.
    NegativeField { field: String, value: Decimal },

    /// A derived field does not follow from the fields it is derived from.
    IdentityViolated {
        identity: &'static str,
        expected: Decimal,
        found: Decimal,
    },

    /// A field is larger than the value that caps it.
    CapExceeded {
        field: &'static str,
        value: Decimal,
        cap: Decimal,
    },

    /// Two breakdowns disagree on a field.
    FieldDiffers {
        field: String,
        expected: String,
        actual: String,
    },
}

impl fmt::Display for AuditFinding {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::NegativeField { field, value } => {
                write!(f, "{field} is negative ({value})")
            }
            Self::IdentityViolated {
                identity,
                expected,
                found,
            } => write!(f, "{identity}: expected {expected}, found {found}"),
            Self::CapExceeded { field, value, cap } => {
                write!(f, "{field} of {value} exceeds {cap}")
            }
            Self::FieldDiffers {
                field,
                expected,
                actual,
            } => write!(f, "{field}: expected {expected}, got {actual}"),
        }
    }
}

fn within_tolerance(
    a: Decimal,
    b: Decimal,
) -> bool {
    (a - b).abs() <= TOLERANCE
}

/// Scalar fields in display order, paired with their serialized names.
fn scalar_fields(b: &TaxBreakdown) -> [(&'static str, Decimal); 17] {
    [
        ("totalIncome", b.total_income),
        ("totalAboveTheLineDeductions", b.total_above_the_line_deductions),
        ("adjustedGrossIncome", b.adjusted_gross_income),
        ("standardDeduction", b.standard_deduction),
        ("taxableIncome", b.taxable_income),
        ("initialFederalTax", b.initial_federal_tax),
        ("totalNonrefundableCredits", b.total_nonrefundable_credits),
        ("nonrefundableCreditsForfeited", b.nonrefundable_credits_forfeited),
        ("taxAfterNonrefundableCredits", b.tax_after_nonrefundable_credits),
        ("totalRefundableCredits", b.total_refundable_credits),
        ("finalTaxOrRefund", b.final_tax_or_refund),
        ("taxableOrdinaryIncome", b.taxable_ordinary_income),
        ("taxablePreferentialIncome", b.taxable_preferential_income),
        ("taxOnOrdinaryIncome", b.tax_on_ordinary_income),
        ("taxOnPreferentialIncome", b.tax_on_preferential_income),
        ("effectiveTaxRate", b.effective_tax_rate),
        ("nonrefundableCreditsClaimed", b.nonrefundable_credits_claimed),
    ]
}

/// Credit fields older producers never emit. They deserialize as zero, so
/// they are only compared when `actual` reports them.
const CREDIT_SPLIT_FIELDS: [&str; 2] = [
    "nonrefundableCreditsClaimed",
    "nonrefundableCreditsForfeited",
];

fn reports_credit_split(b: &TaxBreakdown) -> bool {
    !b.nonrefundable_credits_claimed.is_zero() || !b.nonrefundable_credits_forfeited.is_zero()
}

/// Fields that may legitimately be negative.
const SIGNED_FIELDS: [&str; 3] = ["adjustedGrossIncome", "finalTaxOrRefund", "effectiveTaxRate"];

/// Checks a breakdown against every arithmetic identity it must satisfy.
///
/// Returns an empty list when the breakdown is consistent.
///
/// ```
/// use tax_core::{TaxBreakdown, audit_breakdown};
///
/// let json = r#"{
///     "totalIncome": 100, "totalAboveTheLineDeductions": 0,
///     "adjustedGrossIncome": 100, "standardDeduction": 14600,
///     "taxableIncome": 0, "initialFederalTax": 0,
///     "totalNonrefundableCredits": 0, "taxAfterNonrefundableCredits": 0,
///     "totalRefundableCredits": 0, "finalTaxOrRefund": 0,
///     "taxableOrdinaryIncome": 0, "taxablePreferentialIncome": 0,
///     "taxOnOrdinaryIncome": 0, "taxOnPreferentialIncome": 0,
///     "effectiveTaxRate": 0, "taxBrackets": [], "incomeTaxDetails": []
/// }"#;
/// let breakdown: TaxBreakdown = serde_json::from_str(json).unwrap();
///
/// assert!(audit_breakdown(&breakdown).is_empty());
/// ```
pub fn audit_breakdown(b: &TaxBreakdown) -> Vec<AuditFinding> {
    let mut findings = Vec::new();

    for (field, value) in scalar_fields(b) {
        if value < Decimal::ZERO && !SIGNED_FIELDS.contains(&field) {
            findings.push(AuditFinding::NegativeField {
                field: field.to_string(),
                value,
            });
        }
    }
    check_slices("taxBrackets", &b.tax_brackets, &mut findings);
    check_slices("preferentialTiers", &b.preferential_tiers, &mut findings);
    for (index, detail) in b.income_tax_details.iter().enumerate() {
        for (name, value) in [("amount", detail.amount), ("estimatedTax", detail.estimated_tax)] {
            if value < Decimal::ZERO {
                findings.push(AuditFinding::NegativeField {
                    field: format!("incomeTaxDetails[{index}].{name}"),
                    value,
                });
            }
        }
    }

    let mut identity = |identity: &'static str, expected: Decimal, found: Decimal| {
        if !within_tolerance(expected, found) {
            findings.push(AuditFinding::IdentityViolated {
                identity,
                expected,
                found,
            });
        }
    };

    identity(
        "adjustedGrossIncome = totalIncome - totalAboveTheLineDeductions",
        b.total_income - b.total_above_the_line_deductions,
        b.adjusted_gross_income,
    );
    identity(
        "taxableIncome = max(0, adjustedGrossIncome - standardDeduction)",
        max(b.adjusted_gross_income - b.standard_deduction, Decimal::ZERO),
        b.taxable_income,
    );
    identity(
        "taxableOrdinaryIncome = taxableIncome - taxablePreferentialIncome",
        b.taxable_income - b.taxable_preferential_income,
        b.taxable_ordinary_income,
    );
    identity(
        "initialFederalTax = taxOnOrdinaryIncome + taxOnPreferentialIncome",
        b.tax_on_ordinary_income + b.tax_on_preferential_income,
        b.initial_federal_tax,
    );
    identity(
        "taxAfterNonrefundableCredits = max(0, initialFederalTax - totalNonrefundableCredits)",
        max(
            b.initial_federal_tax - b.total_nonrefundable_credits,
            Decimal::ZERO,
        ),
        b.tax_after_nonrefundable_credits,
    );
    identity(
        "finalTaxOrRefund = taxAfterNonrefundableCredits - totalRefundableCredits",
        b.tax_after_nonrefundable_credits - b.total_refundable_credits,
        b.final_tax_or_refund,
    );
    identity(
        "effectiveTaxRate = finalTaxOrRefund / totalIncome × 100",
        percent_of(b.final_tax_or_refund, b.total_income),
        b.effective_tax_rate,
    );
    identity(
        "sum(taxBrackets) = taxOnOrdinaryIncome",
        sum(b.tax_brackets.iter().map(|s| s.tax_on_income)),
        b.tax_on_ordinary_income,
    );
    if !b.preferential_tiers.is_empty() {
        identity(
            "sum(preferentialTiers) = taxOnPreferentialIncome",
            sum(b.preferential_tiers.iter().map(|s| s.tax_on_income)),
            b.tax_on_preferential_income,
        );
    }
    identity(
        "sum(incomeTaxDetails) = initialFederalTax",
        sum(b.income_tax_details.iter().map(|d| d.estimated_tax)),
        b.initial_federal_tax,
    );

    for (field, value, cap) in [
        (
            "taxablePreferentialIncome",
            b.taxable_preferential_income,
            b.taxable_income,
        ),
        (
            "totalNonrefundableCredits",
            b.total_nonrefundable_credits,
            b.initial_federal_tax,
        ),
    ] {
        if value > cap + TOLERANCE {
            findings.push(AuditFinding::CapExceeded { field, value, cap });
        }
    }

    findings
}

fn check_slices(
    name: &str,
    slices: &[TaxBracketSlice],
    findings: &mut Vec<AuditFinding>,
) {
    for (index, slice) in slices.iter().enumerate() {
        for (part, value) in [
            ("rate", slice.rate),
            ("incomeInBracket", slice.income_in_bracket),
            ("taxOnIncome", slice.tax_on_income),
        ] {
            if value < Decimal::ZERO {
                findings.push(AuditFinding::NegativeField {
                    field: format!("{name}[{index}].{part}"),
                    value,
                });
            }
        }
    }
}

/// Lists every field on which `actual` departs from `expected`.
///
/// Scalars are compared within one cent. Slices are compared position by
/// position and income details by source. The claimed and forfeited credit
/// split is skipped when `actual` leaves both at zero.
pub fn compare_breakdowns(
    expected: &TaxBreakdown,
    actual: &TaxBreakdown,
) -> Vec<AuditFinding> {
    let credit_split = reports_credit_split(actual);
    let mut findings: Vec<AuditFinding> = scalar_fields(expected)
        .into_iter()
        .zip(scalar_fields(actual))
        .filter(|((field, _), _)| credit_split || !CREDIT_SPLIT_FIELDS.contains(field))
        .filter(|((_, e), (_, a))| !within_tolerance(*e, *a))
        .map(|((field, e), (_, a))| differs(field.to_string(), e, a))
        .collect();

    compare_slices(
        "taxBrackets",
        &expected.tax_brackets,
        &actual.tax_brackets,
        &mut findings,
    );

    for detail in &expected.income_tax_details {
        let field = format!("incomeTaxDetails[{}]", detail.source.key());
        match actual
            .income_tax_details
            .iter()
            .find(|other| other.source == detail.source)
        {
            Some(other) if !within_tolerance(detail.estimated_tax, other.estimated_tax) => {
                findings.push(differs(
                    format!("{field}.estimatedTax"),
                    detail.estimated_tax,
                    other.estimated_tax,
                ));
            }
            Some(_) => {}
            None => findings.push(AuditFinding::FieldDiffers {
                field,
                expected: detail.estimated_tax.to_string(),
                actual: "missing".to_string(),
            }),
        }
    }
    for other in &actual.income_tax_details {
        if !expected
            .income_tax_details
            .iter()
            .any(|detail| detail.source == other.source)
        {
            findings.push(AuditFinding::FieldDiffers {
                field: format!("incomeTaxDetails[{}]", other.source.key()),
                expected: "missing".to_string(),
                actual: other.estimated_tax.to_string(),
            });
        }
    }

    findings
}

fn differs(
    field: String,
    expected: Decimal,
    actual: Decimal,
) -> AuditFinding {
    AuditFinding::FieldDiffers {
        field,
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}

fn compare_slices(
    name: &str,
    expected: &[TaxBracketSlice],
    actual: &[TaxBracketSlice],
    findings: &mut Vec<AuditFinding>,
) {
    if expected.len() != actual.len() {
        findings.push(AuditFinding::FieldDiffers {
            field: format!("{name}.len"),
            expected: expected.len().to_string(),
            actual: actual.len().to_string(),
        });
        return;
    }

    for (index, (e, a)) in expected.iter().zip(actual).enumerate() {
        for (part, ev, av) in [
            ("rate", e.rate, a.rate),
            ("incomeInBracket", e.income_in_bracket, a.income_in_bracket),
            ("taxOnIncome", e.tax_on_income, a.tax_on_income),
        ] {
            // Rates are fractions; a cent of slack would hide a whole point.
            if ev != av && (part == "rate" || !within_tolerance(ev, av)) {
                findings.push(differs(format!("{name}[{index}].{part}"), ev, av));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{IncomeSource, IncomeTaxDetail, TaxCharacter};

    /// Single filer, 50,000 of wages, 2024 tables.
    fn consistent() -> TaxBreakdown {
        TaxBreakdown {
            tax_year: 2024,
            total_income: dec!(50000),
            total_above_the_line_deductions: dec!(0),
            adjusted_gross_income: dec!(50000),
            standard_deduction: dec!(14600),
            taxable_income: dec!(35400),
            initial_federal_tax: dec!(4016),
            nonrefundable_credits_claimed: dec!(0),
            total_nonrefundable_credits: dec!(0),
            nonrefundable_credits_forfeited: dec!(0),
            tax_after_nonrefundable_credits: dec!(4016),
            total_refundable_credits: dec!(0),
            final_tax_or_refund: dec!(4016),
            taxable_ordinary_income: dec!(35400),
            taxable_preferential_income: dec!(0),
            tax_on_ordinary_income: dec!(4016),
            tax_on_preferential_income: dec!(0),
            effective_tax_rate: dec!(8.03),
            tax_brackets: vec![
                TaxBracketSlice {
                    rate: dec!(0.10),
                    income_in_bracket: dec!(11600),
                    tax_on_income: dec!(1160),
                },
                TaxBracketSlice {
                    rate: dec!(0.12),
                    income_in_bracket: dec!(23800),
                    tax_on_income: dec!(2856),
                },
            ],
            preferential_tiers: Vec::new(),
            income_tax_details: vec![IncomeTaxDetail {
                source: IncomeSource::Wages,
                amount: dec!(50000),
                estimated_tax: dec!(4016),
                tax_character: TaxCharacter::Ordinary,
            }],
        }
    }

    #[test]
    fn consistent_breakdown_has_no_findings() {
        assert_eq!(audit_breakdown(&consistent()), Vec::new());
    }

    #[test]
    fn one_cent_drift_is_tolerated() {
        let breakdown = TaxBreakdown {
            final_tax_or_refund: dec!(4016.01),
            ..consistent()
        };

        assert_eq!(audit_breakdown(&breakdown), Vec::new());
    }

    #[test]
    fn broken_agi_identity_is_reported() {
        let breakdown = TaxBreakdown {
            adjusted_gross_income: dec!(49000),
            ..consistent()
        };

        let findings = audit_breakdown(&breakdown);

        assert!(findings.contains(&AuditFinding::IdentityViolated {
            identity: "adjustedGrossIncome = totalIncome - totalAboveTheLineDeductions",
            expected: dec!(50000),
            found: dec!(49000),
        }));
    }

    #[test]
    fn negative_tax_is_reported() {
        let breakdown = TaxBreakdown {
            initial_federal_tax: dec!(-5),
            ..consistent()
        };

        let findings = audit_breakdown(&breakdown);

        assert!(findings.contains(&AuditFinding::NegativeField {
            field: "initialFederalTax".to_string(),
            value: dec!(-5),
        }));
    }

    #[test]
    fn nonrefundable_credits_above_tax_are_reported() {
        let breakdown = TaxBreakdown {
            total_nonrefundable_credits: dec!(5000),
            tax_after_nonrefundable_credits: dec!(0),
            final_tax_or_refund: dec!(0),
            effective_tax_rate: dec!(0),
            ..consistent()
        };

        let findings = audit_breakdown(&breakdown);

        assert_eq!(
            findings,
            vec![AuditFinding::CapExceeded {
                field: "totalNonrefundableCredits",
                value: dec!(5000),
                cap: dec!(4016),
            }]
        );
    }

    #[test]
    fn compare_identical_breakdowns_is_empty() {
        assert_eq!(compare_breakdowns(&consistent(), &consistent()), Vec::new());
    }

    #[test]
    fn compare_reports_differing_scalars_and_details() {
        let mut actual = consistent();
        actual.final_tax_or_refund = dec!(3900);
        actual.income_tax_details[0].estimated_tax = dec!(3900);

        let findings = compare_breakdowns(&consistent(), &actual);

        assert_eq!(
            findings,
            vec![
                AuditFinding::FieldDiffers {
                    field: "finalTaxOrRefund".to_string(),
                    expected: "4016".to_string(),
                    actual: "3900".to_string(),
                },
                AuditFinding::FieldDiffers {
                    field: "incomeTaxDetails[wages].estimatedTax".to_string(),
                    expected: "4016".to_string(),
                    actual: "3900".to_string(),
                },
            ]
        );
    }

    /// [`consistent`] with a 200 saver's credit applied.
    fn with_savers_credit() -> TaxBreakdown {
        TaxBreakdown {
            nonrefundable_credits_claimed: dec!(200),
            total_nonrefundable_credits: dec!(200),
            tax_after_nonrefundable_credits: dec!(3816),
            final_tax_or_refund: dec!(3816),
            effective_tax_rate: dec!(7.63),
            ..consistent()
        }
    }

    #[test]
    fn compare_skips_credit_split_missing_from_actual() {
        let json = r#"{
            "totalIncome": 50000, "totalAboveTheLineDeductions": 0,
            "adjustedGrossIncome": 50000, "standardDeduction": 14600,
            "taxableIncome": 35400, "initialFederalTax": 4016,
            "totalNonrefundableCredits": 200, "taxAfterNonrefundableCredits": 3816,
            "totalRefundableCredits": 0, "finalTaxOrRefund": 3816,
            "taxableOrdinaryIncome": 35400, "taxablePreferentialIncome": 0,
            "taxOnOrdinaryIncome": 4016, "taxOnPreferentialIncome": 0,
            "effectiveTaxRate": 7.63,
            "taxBrackets": [
                {"rate": 0.10, "incomeInBracket": 11600, "taxOnIncome": 1160},
                {"rate": 0.12, "incomeInBracket": 23800, "taxOnIncome": 2856}
            ],
            "incomeTaxDetails": [
                {"sourceName": "Wages, Salaries", "amount": 50000,
                 "estimatedTax": 4016, "taxType": "Ordinary"}
            ]
        }"#;
        let actual: TaxBreakdown = serde_json::from_str(json).unwrap();

        assert_eq!(audit_breakdown(&actual), Vec::new());
        assert_eq!(compare_breakdowns(&with_savers_credit(), &actual), Vec::new());
    }

    #[test]
    fn compare_checks_credit_split_when_actual_reports_it() {
        let actual = TaxBreakdown {
            nonrefundable_credits_claimed: dec!(150),
            ..with_savers_credit()
        };

        let findings = compare_breakdowns(&with_savers_credit(), &actual);

        assert_eq!(
            findings,
            vec![AuditFinding::FieldDiffers {
                field: "nonrefundableCreditsClaimed".to_string(),
                expected: "200".to_string(),
                actual: "150".to_string(),
            }]
        );
    }

    #[test]
    fn compare_reports_bracket_count_mismatch() {
        let mut actual = consistent();
        actual.tax_brackets.pop();

        let findings = compare_breakdowns(&consistent(), &actual);

        assert_eq!(
            findings,
            vec![AuditFinding::FieldDiffers {
                field: "taxBrackets.len".to_string(),
                expected: "2".to_string(),
                actual: "1".to_string(),
            }]
        );
    }

    #[test]
    fn camel_case_json_round_trips_through_audit() {
        let json = serde_json::to_string(&consistent()).unwrap();
        assert!(json.contains("\"sourceName\":\"wages\""));

        let parsed: TaxBreakdown = serde_json::from_str(&json).unwrap();

        assert_eq!(compare_breakdowns(&consistent(), &parsed), Vec::new());
    }

    #[test]
    fn finding_display_is_readable() {
        let finding = AuditFinding::CapExceeded {
            field: "taxablePreferentialIncome",
            value: dec!(10),
            cap: dec!(5),
        };

        assert_eq!(finding.to_string(), "taxablePreferentialIncome of 10 exceeds 5");
    }
}
