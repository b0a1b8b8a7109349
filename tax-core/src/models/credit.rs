use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Refundability {
    /// May reduce the tax below zero and produce a refund.
    Refundable,
    /// Reduces the tax no lower than zero.
    Nonrefundable,
}

/// The fixed catalog of credits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CreditKind {
    Eitc,
    ChildTaxCreditRefundable,
    AmericanOpportunityCreditRefundable,
    PremiumTaxCredit,
    RecoveryRebateCredit,
    ChildTaxCreditNonrefundable,
    OtherDependentsCredit,
    SaversCredit,
    LifetimeLearningCredit,
    AmericanOpportunityCreditNonrefundable,
    ForeignTaxCredit,
    AdoptionCredit,
    ResidentialEnergyCredit,
    EvTaxCredit,
    ElderlyDisabledCredit,
    ElectricMotorcycleCredit,
    ChildcareCredit,
}

impl CreditKind {
    pub const ALL: [CreditKind; 17] = [
        Self::Eitc,
        Self::ChildTaxCreditRefundable,
        Self::AmericanOpportunityCreditRefundable,
        Self::PremiumTaxCredit,
        Self::RecoveryRebateCredit,
        Self::ChildTaxCreditNonrefundable,
        Self::OtherDependentsCredit,
        Self::SaversCredit,
        Self::LifetimeLearningCredit,
        Self::AmericanOpportunityCreditNonrefundable,
        Self::ForeignTaxCredit,
        Self::AdoptionCredit,
        Self::ResidentialEnergyCredit,
        Self::EvTaxCredit,
        Self::ElderlyDisabledCredit,
        Self::ElectricMotorcycleCredit,
        Self::ChildcareCredit,
    ];

    pub fn refundability(&self) -> Refundability {
        match self {
            Self::Eitc
            | Self::ChildTaxCreditRefundable
            | Self::AmericanOpportunityCreditRefundable
            | Self::PremiumTaxCredit
            | Self::RecoveryRebateCredit => Refundability::Refundable,
            Self::ChildTaxCreditNonrefundable
            | Self::OtherDependentsCredit
            | Self::SaversCredit
            | Self::LifetimeLearningCredit
            | Self::AmericanOpportunityCreditNonrefundable
            | Self::ForeignTaxCredit
            | Self::AdoptionCredit
            | Self::ResidentialEnergyCredit
            | Self::EvTaxCredit
            | Self::ElderlyDisabledCredit
            | Self::ElectricMotorcycleCredit
            | Self::ChildcareCredit => Refundability::Nonrefundable,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Eitc => "eitc",
            Self::ChildTaxCreditRefundable => "childTaxCreditRefundable",
            Self::AmericanOpportunityCreditRefundable => "americanOpportunityCreditRefundable",
            Self::PremiumTaxCredit => "premiumTaxCredit",
            Self::RecoveryRebateCredit => "recoveryRebateCredit",
            Self::ChildTaxCreditNonrefundable => "childTaxCreditNonrefundable",
            Self::OtherDependentsCredit => "otherDependentsCredit",
            Self::SaversCredit => "saversCredit",
            Self::LifetimeLearningCredit => "lifetimeLearningCredit",
            Self::AmericanOpportunityCreditNonrefundable => {
                "americanOpportunityCreditNonrefundable"
            }
            Self::ForeignTaxCredit => "foreignTaxCredit",
            Self::AdoptionCredit => "adoptionCredit",
            Self::ResidentialEnergyCredit => "residentialEnergyCredit",
            Self::EvTaxCredit => "evTaxCredit",
            Self::ElderlyDisabledCredit => "elderlyDisabledCredit",
            Self::ElectricMotorcycleCredit => "electricMotorcycleCredit",
            Self::ChildcareCredit => "childcareCredit",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Eitc => "Earned Income Tax Credit (EITC)",
            Self::ChildTaxCreditRefundable => "Child Tax Credit (Refundable Part)",
            Self::AmericanOpportunityCreditRefundable => "American Opportunity Credit (40%)",
            Self::PremiumTaxCredit => "Premium Tax Credit (ACA)",
            Self::RecoveryRebateCredit => "Recovery Rebate Credit (Past Stimulus)",
            Self::ChildTaxCreditNonrefundable => "Child Tax Credit (Nonrefundable Part)",
            Self::OtherDependentsCredit => "Credit for Other Dependents",
            Self::SaversCredit => "Retirement Savings (Saver's Credit)",
            Self::LifetimeLearningCredit => "Lifetime Learning Credit",
            Self::AmericanOpportunityCreditNonrefundable => "American Opportunity Credit (60%)",
            Self::ForeignTaxCredit => "Foreign Tax Credit",
            Self::AdoptionCredit => "Adoption Credit",
            Self::ResidentialEnergyCredit => "Residential Energy Credits",
            Self::EvTaxCredit => "Clean Vehicle (EV) Tax Credit",
            Self::ElderlyDisabledCredit => "Elderly and Disabled Credit",
            Self::ElectricMotorcycleCredit => "Plug-in Motorcycle Credit",
            Self::ChildcareCredit => "Child/Dependent Care Credit",
        }
    }
}

impl fmt::Display for CreditKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditLine {
    pub kind: CreditKind,
    pub amount: Decimal,
}

impl CreditLine {
    pub fn new(
        kind: CreditKind,
        amount: Decimal,
    ) -> Self {
        Self { kind, amount }
    }

    pub fn refundability(&self) -> Refundability {
        self.kind.refundability()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn catalog_splits_five_refundable_and_twelve_nonrefundable() {
        let refundable = CreditKind::ALL
            .iter()
            .filter(|k| k.refundability() == Refundability::Refundable)
            .count();

        assert_eq!(refundable, 5);
        assert_eq!(CreditKind::ALL.len() - refundable, 12);
    }

    #[test]
    fn keys_round_trip() {
        for kind in CreditKind::ALL {
            assert_eq!(CreditKind::from_key(kind.key()), Some(kind));
        }
    }
}
