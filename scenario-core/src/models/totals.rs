use serde::{Deserialize, Serialize};

use crate::calculations::common::checked_sum;
use crate::error::ScenarioError;
use crate::models::Money;

/// A complete tax position: federal, state and their sum, together with the
/// taxable income they were computed on.
///
/// `total_tax == federal_tax + state_tax` holds for every value of this type.
/// [`Totals::new`] derives the total; [`Totals::from_parts`] and
/// deserialization reject totals that do not reconcile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TotalsRecord")]
pub struct Totals {
    federal_tax: Money,
    state_tax: Money,
    total_tax: Money,
    taxable_income: Money,
}

impl Totals {
    /// # Panics
    ///
    /// If `federal_tax + state_tax` overflows. Use [`Totals::try_new`] for
    /// figures that have not been bounded.
    pub fn new(
        federal_tax: Money,
        state_tax: Money,
        taxable_income: Money,
    ) -> Self {
        Self {
            federal_tax,
            state_tax,
            total_tax: federal_tax + state_tax,
            taxable_income,
        }
    }

    /// Like [`Totals::new`], but fails with [`ScenarioError::Overflow`]
    /// instead of panicking.
    pub fn try_new(
        federal_tax: Money,
        state_tax: Money,
        taxable_income: Money,
    ) -> Result<Self, ScenarioError> {
        Ok(Self {
            federal_tax,
            state_tax,
            total_tax: checked_sum(federal_tax, state_tax, "total tax")?,
            taxable_income,
        })
    }

    /// Builds totals from externally supplied figures.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::UnbalancedTotals`] when `total_tax` is not
    /// exactly `federal_tax + state_tax`, and [`ScenarioError::Overflow`]
    /// when that sum cannot be represented.
    pub fn from_parts(
        federal_tax: Money,
        state_tax: Money,
        total_tax: Money,
        taxable_income: Money,
    ) -> Result<Self, ScenarioError> {
        let totals = Self::try_new(federal_tax, state_tax, taxable_income)?;
        if totals.total_tax != total_tax {
            return Err(ScenarioError::UnbalancedTotals {
                federal_tax,
                state_tax,
                total_tax,
            });
        }
        Ok(totals)
    }

    pub fn federal_tax(&self) -> Money {
        self.federal_tax
    }

    pub fn state_tax(&self) -> Money {
        self.state_tax
    }

    pub fn total_tax(&self) -> Money {
        self.total_tax
    }

    pub fn taxable_income(&self) -> Money {
        self.taxable_income
    }
}

/// Wire shape of [`Totals`] before reconciliation.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TotalsRecord {
    federal_tax: Money,
    state_tax: Money,
    total_tax: Money,
    taxable_income: Money,
}

impl TryFrom<TotalsRecord> for Totals {
    type Error = ScenarioError;

    fn try_from(record: TotalsRecord) -> Result<Self, Self::Error> {
        Totals::from_parts(
            record.federal_tax,
            record.state_tax,
            record.total_tax,
            record.taxable_income,
        )
    }
}
