use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::FilingStatusCode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardDeduction {
    pub filing_status: FilingStatusCode,
    pub amount: Decimal,
    /// Added once per taxpayer at or above the senior age.
    pub additional_age_amount: Decimal,
}
