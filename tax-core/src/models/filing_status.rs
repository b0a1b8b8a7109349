use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilingStatusCode {
    Single,
    MarriedFilingJointly,
    MarriedFilingSeparately,
    HeadOfHousehold,
}

impl FilingStatusCode {
    pub const ALL: [FilingStatusCode; 4] = [
        Self::Single,
        Self::MarriedFilingJointly,
        Self::MarriedFilingSeparately,
        Self::HeadOfHousehold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "S",
            Self::MarriedFilingJointly => "MFJ",
            Self::MarriedFilingSeparately => "MFS",
            Self::HeadOfHousehold => "HOH",
        }
    }

    /// Parses either the short code (`MFJ`) or the form key (`marriedFilingJointly`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "S" | "single" => Some(Self::Single),
            "MFJ" | "marriedFilingJointly" => Some(Self::MarriedFilingJointly),
            "MFS" | "marriedFilingSeparately" => Some(Self::MarriedFilingSeparately),
            "HOH" | "headOfHousehold" => Some(Self::HeadOfHousehold),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::MarriedFilingJointly => "Married Filing Jointly",
            Self::MarriedFilingSeparately => "Married Filing Separately",
            Self::HeadOfHousehold => "Head of Household",
        }
    }

    /// Only a joint return carries the spouse's age into the calculation.
    pub fn requires_spouse_age(&self) -> bool {
        matches!(self, Self::MarriedFilingJointly)
    }
}

impl fmt::Display for FilingStatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.label())
    }
}
