//! Contracts for the jurisdiction tax services the engine consumes.
//!
//! The engine treats both services as synchronous pure functions. Bracket
//! tables, deductions and credit phaseouts live behind these traits; the
//! engine never recomputes any of them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{FederalFilingStatus, Money, StateCode, StateFilingStatus};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxServiceError {
    #[error("jurisdiction not supported: {0}")]
    UnsupportedJurisdiction(String),

    #[error("tax year {requested} not supported (service is configured for {configured})")]
    UnsupportedTaxYear { requested: i32, configured: i32 },

    #[error("invalid input {field} = {value}")]
    InvalidInput { field: &'static str, value: Money },

    #[error("no table available for {0}")]
    MissingTable(String),
}

impl TaxServiceError {
    /// Whether the service was asked about something it is not configured
    /// for, as opposed to rejecting the figures it was given.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedJurisdiction(_) | Self::UnsupportedTaxYear { .. } | Self::MissingTable(_)
        )
    }
}

/// Inputs for one federal income tax computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederalTaxInput {
    pub filing_status: FederalFilingStatus,
    pub agi: Money,
    pub taxable_ordinary_income_after_deduction: Money,
    pub taxable_preferential_income_after_deduction: Money,
    pub qualifying_children_under_17: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederalTaxOutput {
    /// Income tax after the Child Tax Credit, phaseout and nonrefundable
    /// limit already applied.
    pub income_tax_after_ctc: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTaxInput {
    pub tax_year: i32,
    pub state: StateCode,
    pub filing_status: StateFilingStatus,
    pub taxable_base: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTaxOutput {
    pub state_income_tax: Money,
}

pub trait FederalTaxService: Send + Sync {
    fn compute_federal_baseline(
        &self,
        input: &FederalTaxInput,
    ) -> Result<FederalTaxOutput, TaxServiceError>;

    fn standard_deduction(
        &self,
        filing_status: FederalFilingStatus,
    ) -> Result<Money, TaxServiceError>;
}

pub trait StateTaxService: Send + Sync {
    fn compute_state_income_tax(
        &self,
        input: &StateTaxInput,
    ) -> Result<StateTaxOutput, TaxServiceError>;
}

impl<T: FederalTaxService + ?Sized> FederalTaxService for &T {
    fn compute_federal_baseline(
        &self,
        input: &FederalTaxInput,
    ) -> Result<FederalTaxOutput, TaxServiceError> {
        (**self).compute_federal_baseline(input)
    }

    fn standard_deduction(
        &self,
        filing_status: FederalFilingStatus,
    ) -> Result<Money, TaxServiceError> {
        (**self).standard_deduction(filing_status)
    }
}

impl<T: StateTaxService + ?Sized> StateTaxService for &T {
    fn compute_state_income_tax(
        &self,
        input: &StateTaxInput,
    ) -> Result<StateTaxOutput, TaxServiceError> {
        (**self).compute_state_income_tax(input)
    }
}
