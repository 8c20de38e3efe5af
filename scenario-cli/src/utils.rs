use rust_decimal::Decimal;
use scenario_core::{FilingStatus, ScenarioError, StateCode};
use thiserror::Error;

/// Error returned when a string cannot be parsed as an amount.
#[derive(Debug, Error)]
pub enum ParseDecimalError {
    #[error("invalid decimal '{input}': {source}")]
    Invalid {
        input: String,
        #[source]
        source: rust_decimal::Error,
    },

    #[error("'{input}' must not be negative")]
    Negative { input: String },
}

/// Normalizes input for decimal parsing: trims whitespace and removes commas (thousands separator).
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a string into a [`Decimal`].
///
/// Handles comma as thousands separator (e.g. `"1,234.56"`) and a leading
/// minus sign. Empty input is an error.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    normalize_decimal_input(s)
        .parse()
        .map_err(|source| ParseDecimalError::Invalid {
            input: s.to_string(),
            source,
        })
}

/// Like [`parse_decimal`], but rejects amounts below zero.
pub fn parse_non_negative_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let value = parse_decimal(s)?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ParseDecimalError::Negative {
            input: s.to_string(),
        });
    }
    Ok(value)
}

/// Parses an intake filing status.
///
/// Case is ignored and `-` or spaces stand in for `_`, so `single`,
/// `married-filing-jointly` and `HEAD_OF_HOUSEHOLD` are all accepted.
pub fn parse_filing_status(s: &str) -> Result<FilingStatus, ScenarioError> {
    let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
    FilingStatus::parse(&normalized).ok_or_else(|| ScenarioError::UnknownFilingStatus(s.to_string()))
}

/// Parses a two-letter state code, ignoring case.
pub fn parse_state_code(s: &str) -> Result<StateCode, ScenarioError> {
    StateCode::new(&s.trim().to_ascii_uppercase())
}
