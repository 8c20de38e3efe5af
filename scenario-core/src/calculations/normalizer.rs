//! Filing status normalization.
//!
//! Intake records one filing status; the federal and state services each
//! expect their own code for it. The translation tables below are the only
//! place those code sets meet.

use serde::{Deserialize, Serialize};

use crate::error::ScenarioError;
use crate::models::{FederalFilingStatus, FilingStatus, StateFilingStatus};

const FEDERAL_CODES: [(FilingStatus, FederalFilingStatus); 4] = [
    (FilingStatus::Single, FederalFilingStatus::Single),
    (FilingStatus::MarriedFilingJointly, FederalFilingStatus::MarriedFilingJointly),
    (FilingStatus::MarriedFilingSeparately, FederalFilingStatus::MarriedFilingSeparately),
    (FilingStatus::HeadOfHousehold, FederalFilingStatus::HeadOfHousehold),
];

const STATE_CODES: [(FilingStatus, StateFilingStatus); 4] = [
    (FilingStatus::Single, StateFilingStatus::Single),
    (FilingStatus::MarriedFilingJointly, StateFilingStatus::Joint),
    (FilingStatus::MarriedFilingSeparately, StateFilingStatus::Separate),
    (FilingStatus::HeadOfHousehold, StateFilingStatus::HeadOfHousehold),
];

/// One intake filing status translated for both services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedFilingStatus {
    pub intake: FilingStatus,
    pub federal: FederalFilingStatus,
    pub state: StateFilingStatus,
}

/// Parses an intake filing-status code and translates it.
///
/// # Errors
///
/// Returns [`ScenarioError::UnknownFilingStatus`] for anything other than
/// the four intake codes. There is no fallback status.
pub fn normalize_filing_status(code: &str) -> Result<NormalizedFilingStatus, ScenarioError> {
    let intake = FilingStatus::parse(code)
        .ok_or_else(|| ScenarioError::UnknownFilingStatus(code.to_string()))?;
    normalize(intake)
}

/// Translates an already-parsed intake status.
///
/// # Errors
///
/// Returns [`ScenarioError::UnknownFilingStatus`] if either table lacks an
/// entry for `intake`.
pub fn normalize(intake: FilingStatus) -> Result<NormalizedFilingStatus, ScenarioError> {
    let federal = lookup(&FEDERAL_CODES, intake)?;
    let state = lookup(&STATE_CODES, intake)?;

    Ok(NormalizedFilingStatus {
        intake,
        federal,
        state,
    })
}

fn lookup<T: Copy>(
    table: &[(FilingStatus, T)],
    intake: FilingStatus,
) -> Result<T, ScenarioError> {
    table
        .iter()
        .find(|(status, _)| *status == intake)
        .map(|(_, code)| *code)
        .ok_or_else(|| ScenarioError::UnknownFilingStatus(intake.to_string()))
}
