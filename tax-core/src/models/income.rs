use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How an income source is taxed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxCharacter {
    /// Taxed on the progressive ordinary brackets.
    Ordinary,
    /// Taxed on the 0/15/20% schedule, stacked above ordinary income.
    Preferential,
}

impl fmt::Display for TaxCharacter {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Ordinary => f.write_str("Ordinary"),
            Self::Preferential => f.write_str("Preferential"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncomeGroup {
    Earned,
    Investment,
    RetirementAndGovernment,
    PassiveAndMiscellaneous,
}

impl IncomeGroup {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Earned => "Earned Income",
            Self::Investment => "Investment Income",
            Self::RetirementAndGovernment => "Retirement & Government Income",
            Self::PassiveAndMiscellaneous => "Passive & Miscellaneous Income",
        }
    }
}

/// The fixed catalog of income sources.
///
/// Declaration order is catalog order; `Ord` follows it so maps keyed by
/// source iterate the way the form presents them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IncomeSource {
    Wages,
    Tips,
    SelfEmployment,
    Interest,
    OrdinaryDividends,
    QualifiedDividends,
    ShortTermCapitalGains,
    LongTermCapitalGains,
    AnnuitiesReits,
    RetirementDistributions,
    SocialSecurity,
    Unemployment,
    RentalRoyalties,
    Other,
}

impl IncomeSource {
    pub const ALL: [IncomeSource; 14] = [
        Self::Wages,
        Self::Tips,
        Self::SelfEmployment,
        Self::Interest,
        Self::OrdinaryDividends,
        Self::QualifiedDividends,
        Self::ShortTermCapitalGains,
        Self::LongTermCapitalGains,
        Self::AnnuitiesReits,
        Self::RetirementDistributions,
        Self::SocialSecurity,
        Self::Unemployment,
        Self::RentalRoyalties,
        Self::Other,
    ];

    pub fn tax_character(&self) -> TaxCharacter {
        match self {
            Self::QualifiedDividends | Self::LongTermCapitalGains => TaxCharacter::Preferential,
            Self::Wages
            | Self::Tips
            | Self::SelfEmployment
            | Self::Interest
            | Self::OrdinaryDividends
            | Self::ShortTermCapitalGains
            | Self::AnnuitiesReits
            | Self::RetirementDistributions
            | Self::SocialSecurity
            | Self::Unemployment
            | Self::RentalRoyalties
            | Self::Other => TaxCharacter::Ordinary,
        }
    }

    pub fn group(&self) -> IncomeGroup {
        match self {
            Self::Wages | Self::Tips | Self::SelfEmployment => IncomeGroup::Earned,
            Self::Interest
            | Self::OrdinaryDividends
            | Self::QualifiedDividends
            | Self::ShortTermCapitalGains
            | Self::LongTermCapitalGains
            | Self::AnnuitiesReits => IncomeGroup::Investment,
            Self::RetirementDistributions | Self::SocialSecurity | Self::Unemployment => {
                IncomeGroup::RetirementAndGovernment
            }
            Self::RentalRoyalties | Self::Other => IncomeGroup::PassiveAndMiscellaneous,
        }
    }

    /// The key used in request files and CSV headers.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Wages => "wages",
            Self::Tips => "tips",
            Self::SelfEmployment => "selfEmployment",
            Self::Interest => "interest",
            Self::OrdinaryDividends => "ordinaryDividends",
            Self::QualifiedDividends => "qualifiedDividends",
            Self::ShortTermCapitalGains => "shortTermCapitalGains",
            Self::LongTermCapitalGains => "longTermCapitalGains",
            Self::AnnuitiesReits => "annuitiesReits",
            Self::RetirementDistributions => "retirementDistributions",
            Self::SocialSecurity => "socialSecurity",
            Self::Unemployment => "unemployment",
            Self::RentalRoyalties => "rentalRoyalties",
            Self::Other => "other",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|source| source.key() == key)
    }

    /// Looks a source up by key or, failing that, by display label.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::from_key(s).or_else(|| {
            Self::ALL
                .into_iter()
                .find(|source| source.label().eq_ignore_ascii_case(s))
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Wages => "Wages, Salaries",
            Self::Tips => "Tips",
            Self::SelfEmployment => "Self-Employment, Gig Work",
            Self::Interest => "Interest",
            Self::OrdinaryDividends => "Ordinary Dividends",
            Self::QualifiedDividends => "Qualified Dividends",
            Self::ShortTermCapitalGains => "Short-Term Capital Gains",
            Self::LongTermCapitalGains => "Long-Term Capital Gains",
            Self::AnnuitiesReits => "Annuities & REITs",
            Self::RetirementDistributions => "IRA, 401k, Pensions",
            Self::SocialSecurity => "Social Security Benefits",
            Self::Unemployment => "Unemployment Benefits",
            Self::RentalRoyalties => "Rental & Royalties",
            Self::Other => "Other Miscellaneous Income",
        }
    }
}

impl fmt::Display for IncomeSource {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeLine {
    pub source: IncomeSource,
    pub amount: Decimal,
}

impl IncomeLine {
    pub fn new(
        source: IncomeSource,
        amount: Decimal,
    ) -> Self {
        Self { source, amount }
    }

    pub fn tax_character(&self) -> TaxCharacter {
        self.source.tax_character()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn only_qualified_dividends_and_long_term_gains_are_preferential() {
        let preferential: Vec<_> = IncomeSource::ALL
            .into_iter()
            .filter(|s| s.tax_character() == TaxCharacter::Preferential)
            .collect();

        assert_eq!(
            preferential,
            vec![IncomeSource::QualifiedDividends, IncomeSource::LongTermCapitalGains]
        );
    }

    #[test]
    fn keys_round_trip() {
        for source in IncomeSource::ALL {
            assert_eq!(IncomeSource::from_key(source.key()), Some(source));
        }
        assert_eq!(IncomeSource::from_key("lottery"), None);
    }

    #[test]
    fn parse_falls_back_to_label() {
        assert_eq!(IncomeSource::parse("wages"), Some(IncomeSource::Wages));
        assert_eq!(
            IncomeSource::parse("long-term capital gains"),
            Some(IncomeSource::LongTermCapitalGains)
        );
        assert_eq!(IncomeSource::parse("Lottery"), None);
    }

    #[test]
    fn serde_uses_catalog_keys() {
        for source in IncomeSource::ALL {
            let json = serde_json::to_string(&source).unwrap();
            assert_eq!(json, format!("\"{}\"", source.key()));
        }
    }

    #[test]
    fn every_group_has_a_source() {
        for group in [
            IncomeGroup::Earned,
            IncomeGroup::Investment,
            IncomeGroup::RetirementAndGovernment,
            IncomeGroup::PassiveAndMiscellaneous,
        ] {
            assert!(IncomeSource::ALL.iter().any(|s| s.group() == group), "{}", group.title());
        }
    }
}
