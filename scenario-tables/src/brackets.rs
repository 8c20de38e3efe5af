//! Federal rate schedules.
//!
//! A schedule is a list of brackets, each giving the tax due at its lower
//! bound (`base_tax`) and the marginal rate above it. Tax on an amount is
//! `base_tax + (amount − min_income) × rate` for the bracket the amount
//! falls in, rounded half-up to cents.

use rust_decimal::Decimal;
use scenario_core::calculations::common::round_half_up;
use scenario_core::{FederalFilingStatus, Money, TaxServiceError};
use serde::{Deserialize, Serialize};

use crate::error::TablesError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub tax_year: i32,
    pub filing_status: FederalFilingStatus,
    pub min_income: Decimal,
    pub max_income: Option<Decimal>,
    pub tax_rate: Decimal,
    pub base_tax: Decimal,
}

/// The complete, ordered bracket list for one filing status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketSchedule {
    filing_status: FederalFilingStatus,
    brackets: Vec<TaxBracket>,
}

impl BracketSchedule {
    /// Sorts and checks a bracket list.
    ///
    /// # Errors
    ///
    /// Returns [`TablesError::MalformedSchedule`] unless the brackets start
    /// at zero, are contiguous, and end with an open-ended bracket.
    pub fn new(
        filing_status: FederalFilingStatus,
        mut brackets: Vec<TaxBracket>,
    ) -> Result<Self, TablesError> {
        let malformed = |reason| TablesError::MalformedSchedule {
            status: filing_status,
            reason,
        };

        brackets.sort_by(|a, b| a.min_income.cmp(&b.min_income));

        let first = brackets.first().ok_or_else(|| malformed("no brackets"))?;
        if first.min_income != Decimal::ZERO {
            return Err(malformed("first bracket does not start at zero"));
        }
        for pair in brackets.windows(2) {
            if pair[0].max_income != Some(pair[1].min_income) {
                return Err(malformed("brackets are not contiguous"));
            }
        }
        if brackets.iter().any(|b| b.filing_status != filing_status) {
            return Err(malformed("bracket belongs to another filing status"));
        }
        if brackets.last().is_some_and(|b| b.max_income.is_some()) {
            return Err(malformed("last bracket has an upper bound"));
        }

        Ok(Self {
            filing_status,
            brackets,
        })
    }

    pub fn filing_status(&self) -> FederalFilingStatus {
        self.filing_status
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// Calculates tax on `taxable_income` using this schedule.
    ///
    /// # Errors
    ///
    /// Returns [`TaxServiceError::InvalidInput`] for negative income.
    pub fn tax_on(
        &self,
        taxable_income: Money,
    ) -> Result<Money, TaxServiceError> {
        if taxable_income < Decimal::ZERO {
            return Err(TaxServiceError::InvalidInput {
                field: "taxable_income",
                value: taxable_income,
            });
        }
        if taxable_income == Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }

        let bracket = self
            .brackets
            .iter()
            .find(|b| {
                taxable_income > b.min_income
                    && b.max_income.is_none_or(|max| taxable_income <= max)
            })
            .ok_or_else(|| TaxServiceError::MissingTable(format!(
                "{} bracket containing {taxable_income}",
                self.filing_status
            )))?;

        let marginal_income = taxable_income - bracket.min_income;
        let tax = bracket.base_tax + (marginal_income * bracket.tax_rate);

        Ok(round_half_up(tax))
    }
}
