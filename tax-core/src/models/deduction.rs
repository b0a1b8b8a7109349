use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeductionGroup {
    Common,
    SelfEmployedAndBusiness,
    Other,
}

impl DeductionGroup {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Common => "Common Deductions",
            Self::SelfEmployedAndBusiness => "Self-Employed & Business",
            Self::Other => "Other Deductions",
        }
    }
}

/// The fixed catalog of above-the-line deductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeductionKind {
    IraContribution,
    StudentLoanInterest,
    HsaContributions,
    EducatorExpenses,
    SelfEmploymentTax,
    SepSimpleSolo401k,
    ScheduleCExpenses,
    AlimonyPaid,
    MovingExpensesMilitary,
    EarlyWithdrawalPenalty,
}

impl DeductionKind {
    pub const ALL: [DeductionKind; 10] = [
        Self::IraContribution,
        Self::StudentLoanInterest,
        Self::HsaContributions,
        Self::EducatorExpenses,
        Self::SelfEmploymentTax,
        Self::SepSimpleSolo401k,
        Self::ScheduleCExpenses,
        Self::AlimonyPaid,
        Self::MovingExpensesMilitary,
        Self::EarlyWithdrawalPenalty,
    ];

    pub fn group(&self) -> DeductionGroup {
        match self {
            Self::IraContribution
            | Self::StudentLoanInterest
            | Self::HsaContributions
            | Self::EducatorExpenses => DeductionGroup::Common,
            Self::SelfEmploymentTax | Self::SepSimpleSolo401k | Self::ScheduleCExpenses => {
                DeductionGroup::SelfEmployedAndBusiness
            }
            Self::AlimonyPaid | Self::MovingExpensesMilitary | Self::EarlyWithdrawalPenalty => {
                DeductionGroup::Other
            }
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::IraContribution => "iraContribution",
            Self::StudentLoanInterest => "studentLoanInterest",
            Self::HsaContributions => "hsaContributions",
            Self::EducatorExpenses => "educatorExpenses",
            Self::SelfEmploymentTax => "selfEmploymentTax",
            Self::SepSimpleSolo401k => "sepSimpleSolo401k",
            Self::ScheduleCExpenses => "scheduleCExpenses",
            Self::AlimonyPaid => "alimonyPaid",
            Self::MovingExpensesMilitary => "movingExpensesMilitary",
            Self::EarlyWithdrawalPenalty => "earlyWithdrawalPenalty",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::IraContribution => "Traditional IRA Contributions",
            Self::StudentLoanInterest => "Student Loan Interest",
            Self::HsaContributions => "HSA Contributions",
            Self::EducatorExpenses => "Educator Expenses",
            Self::SelfEmploymentTax => "50% of Self-Employment Tax",
            Self::SepSimpleSolo401k => "SEP/SIMPLE/Solo 401(k)",
            Self::ScheduleCExpenses => "Schedule C Expenses",
            Self::AlimonyPaid => "Alimony Paid (pre-2019)",
            Self::MovingExpensesMilitary => "Moving (Military only)",
            Self::EarlyWithdrawalPenalty => "Penalty on Early CD Withdrawal",
        }
    }
}

impl fmt::Display for DeductionKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionLine {
    pub kind: DeductionKind,
    pub amount: Decimal,
}

impl DeductionLine {
    pub fn new(
        kind: DeductionKind,
        amount: Decimal,
    ) -> Self {
        Self { kind, amount }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn keys_round_trip() {
        for kind in DeductionKind::ALL {
            assert_eq!(DeductionKind::from_key(kind.key()), Some(kind));
        }
    }

    #[test]
    fn serde_matches_key_for_odd_casing() {
        let json = serde_json::to_string(&DeductionKind::SepSimpleSolo401k).unwrap();

        assert_eq!(json, "\"sepSimpleSolo401k\"");
    }
}
