use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::FilingStatusCode;

/// Which rate schedule a bracket belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScheduleKind {
    /// Progressive brackets applied to ordinary income.
    Ordinary,
    /// Capital gains tiers applied to qualified dividends and long-term gains.
    Preferential,
}

impl fmt::Display for ScheduleKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Ordinary => f.write_str("ordinary"),
            Self::Preferential => f.write_str("preferential"),
        }
    }
}

/// One row of a rate schedule.
///
/// `base_tax` is the tax owed on all income below `min_income`; it is carried
/// so a loaded table can be checked against the IRS worksheet figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub filing_status: FilingStatusCode,
    pub min_income: Decimal,
    pub max_income: Option<Decimal>,
    pub tax_rate: Decimal,
    pub base_tax: Decimal,
}

impl TaxBracket {
    /// Width of the bracket, or `None` for the open-ended top bracket.
    pub fn width(&self) -> Option<Decimal> {
        self.max_income.map(|max| max - self.min_income)
    }
}
