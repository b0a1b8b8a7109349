use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid amount '{input}': {message}")]
pub struct ParseDecimalError {
    input: String,
    message: String,
}

/// Error returned when a string cannot be parsed as an age.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid age '{input}': {message}")]
pub struct ParseAgeError {
    input: String,
    message: String,
}

/// Normalizes input for decimal parsing: trims whitespace and removes commas
/// (thousands separator) and dollar signs.
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace([',', '$'], "")
}

/// Parses a string into a [`Decimal`].
///
/// Handles comma as thousands separator and a leading `$` (e.g. `"$1,234.56"`).
/// Empty or whitespace-only input is treated as 0.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e: rust_decimal::Error| {
        tracing::debug!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            message: e.to_string(),
        }
    })
}

/// Parses a whole-number age. Empty input is treated as 0.
pub fn parse_age(s: &str) -> Result<i32, ParseAgeError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed.parse().map_err(|e: std::num::ParseIntError| ParseAgeError {
        input: s.to_string(),
        message: e.to_string(),
    })
}
