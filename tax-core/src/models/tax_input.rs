use serde::{Deserialize, Serialize};

use crate::{CreditLine, DeductionLine, IncomeLine, Situation};

/// The four inputs of one calculation, built fresh from the current form state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxInput {
    pub situation: Situation,
    #[serde(default)]
    pub income: Vec<IncomeLine>,
    #[serde(default)]
    pub deductions: Vec<DeductionLine>,
    #[serde(default)]
    pub credits: Vec<CreditLine>,
}

impl TaxInput {
    pub fn new(situation: Situation) -> Self {
        Self {
            situation,
            income: Vec::new(),
            deductions: Vec::new(),
            credits: Vec::new(),
        }
    }
}
