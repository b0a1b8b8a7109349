//! Calculation request files.
//!
//! A request is a TOML or JSON document:
//!
//! ```toml
//! tax_year = 2025
//!
//! [situation]
//! filingStatus = "marriedFilingJointly"
//! age = 67
//! spouseAge = 63
//!
//! [income]
//! wages = 85000
//! qualifiedDividends = 4200
//!
//! [deductions]
//! hsaContributions = 3000
//!
//! [credits]
//! childTaxCreditNonrefundable = 2000
//! ```
//!
//! Map keys are catalog keys; see `tax-estimator catalog`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tax_core::{
    CreditKind, CreditLine, DeductionKind, DeductionLine, IncomeLine, IncomeSource, Situation,
    TaxInput,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("cannot read request '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML request: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON request: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRequest {
    /// Overrides the configured tax year for this request.
    #[serde(default, alias = "taxYear")]
    pub tax_year: Option<i32>,
    pub situation: Situation,
    #[serde(default)]
    pub income: BTreeMap<IncomeSource, Decimal>,
    #[serde(default)]
    pub deductions: BTreeMap<DeductionKind, Decimal>,
    #[serde(default)]
    pub credits: BTreeMap<CreditKind, Decimal>,
}

impl TaxRequest {
    pub fn from_toml_str(s: &str) -> Result<Self, RequestError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self, RequestError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Reads a request, choosing the format by extension (`.json`, anything
    /// else is TOML).
    pub fn load(path: &Path) -> Result<Self, RequestError> {
        let contents = std::fs::read_to_string(path).map_err(|source| RequestError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_toml_str(&contents)
        }
    }

    /// Lines come out in catalog order.
    pub fn to_input(&self) -> TaxInput {
        TaxInput {
            situation: self.situation.clone(),
            income: self
                .income
                .iter()
                .map(|(&source, &amount)| IncomeLine::new(source, amount))
                .collect(),
            deductions: self
                .deductions
                .iter()
                .map(|(&kind, &amount)| DeductionLine::new(kind, amount))
                .collect(),
            credits: self
                .credits
                .iter()
                .map(|(&kind, &amount)| CreditLine::new(kind, amount))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tax_core::FilingStatusCode;

    use super::*;

    const TOML_REQUEST: &str = r#"
tax_year = 2024

[situation]
filingStatus = "marriedFilingJointly"
age = 60
spouseAge = 66

[income]
longTermCapitalGains = 5000
wages = 100000

[credits]
eitc = 250.50
"#;

    #[test]
    fn toml_request_parses_into_input() {
        let request = TaxRequest::from_toml_str(TOML_REQUEST).expect("valid request");

        assert_eq!(request.tax_year, Some(2024));

        let input = request.to_input();
        assert_eq!(
            input.situation,
            Situation::new(FilingStatusCode::MarriedFilingJointly, 60).with_spouse_age(66)
        );
        // Catalog order, not file order.
        assert_eq!(
            input.income,
            vec![
                IncomeLine::new(IncomeSource::Wages, dec!(100000)),
                IncomeLine::new(IncomeSource::LongTermCapitalGains, dec!(5000)),
            ]
        );
        assert!(input.deductions.is_empty());
        assert_eq!(input.credits, vec![CreditLine::new(CreditKind::Eitc, dec!(250.50))]);
    }

    #[test]
    fn json_request_parses() {
        let json = r#"{
            "taxYear": 2025,
            "situation": { "filingStatus": "single", "age": 30 },
            "income": { "wages": 50000 }
        }"#;

        let request = TaxRequest::from_json_str(json).expect("valid request");

        assert_eq!(request.tax_year, Some(2025));
        assert_eq!(request.situation.spouse_age, None);
        assert_eq!(request.income.get(&IncomeSource::Wages), Some(&dec!(50000)));
    }

    #[test]
    fn unknown_catalog_key_is_rejected() {
        let toml = r#"
[situation]
filingStatus = "single"
age = 30

[income]
lottery = 1000000
"#;

        assert!(matches!(
            TaxRequest::from_toml_str(toml),
            Err(RequestError::Toml(_))
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let result = TaxRequest::load(Path::new("/nonexistent/request.toml"));

        assert!(matches!(result, Err(RequestError::Read { .. })));
    }
}
