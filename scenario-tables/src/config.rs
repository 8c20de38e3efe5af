//! TOML configuration for the reference tables.
//!
//! ```toml
//! tax_year = 2025
//!
//! [standard_deduction]
//! single = 15000
//! married_filing_jointly = 30000
//! married_filing_separately = 15000
//! head_of_household = 22500
//!
//! [child_tax_credit]
//! amount_per_child = 2000
//! phaseout_step = 1000
//! phaseout_reduction_per_step = 50
//!
//! [child_tax_credit.phaseout_threshold]
//! single = 200000
//! married_filing_jointly = 400000
//! married_filing_separately = 200000
//! head_of_household = 200000
//!
//! [[state]]
//! code = "CO"
//! rate = "0.044"
//! ```

use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use scenario_core::{FederalFilingStatus, Money};
use serde::{Deserialize, Serialize};

use crate::error::TablesError;

/// One value per federal filing status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ByFilingStatus<T> {
    pub single: T,
    pub married_filing_jointly: T,
    pub married_filing_separately: T,
    pub head_of_household: T,
}

impl<T: Copy> ByFilingStatus<T> {
    pub fn get(
        &self,
        status: FederalFilingStatus,
    ) -> T {
        match status {
            FederalFilingStatus::Single => self.single,
            FederalFilingStatus::MarriedFilingJointly => self.married_filing_jointly,
            FederalFilingStatus::MarriedFilingSeparately => self.married_filing_separately,
            FederalFilingStatus::HeadOfHousehold => self.head_of_household,
        }
    }

    fn values(&self) -> [T; 4] {
        [
            self.single,
            self.married_filing_jointly,
            self.married_filing_separately,
            self.head_of_household,
        ]
    }
}

/// Child Tax Credit parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChildTaxCreditConfig {
    /// Credit per qualifying child under 17, before phaseout.
    pub amount_per_child: Money,

    /// AGI above which the credit starts to phase out.
    pub phaseout_threshold: ByFilingStatus<Money>,

    /// Each step of AGI over the threshold, or part of one, reduces the
    /// credit by `phaseout_reduction_per_step`.
    pub phaseout_step: Money,

    pub phaseout_reduction_per_step: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateRateConfig {
    pub code: String,
    pub rate: Decimal,
}

/// Parsed tables file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TablesConfig {
    pub tax_year: i32,
    pub standard_deduction: ByFilingStatus<Money>,
    pub child_tax_credit: ChildTaxCreditConfig,
    #[serde(default, rename = "state")]
    pub states: Vec<StateRateConfig>,
}

impl TablesConfig {
    /// Reads and validates a tables file.
    pub fn load(path: &Path) -> Result<Self, TablesError> {
        let text = fs::read_to_string(path).map_err(|source| TablesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parses and validates tables TOML.
    pub fn parse(text: &str) -> Result<Self, TablesError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every amount and rate is in its valid range.
    ///
    /// # Errors
    ///
    /// Returns [`TablesError::OutOfRange`] if:
    /// - any standard deduction, threshold or credit amount is negative
    /// - `phaseout_step` is not positive
    /// - any state rate is outside [0, 1]
    pub fn validate(&self) -> Result<(), TablesError> {
        for amount in self.standard_deduction.values() {
            non_negative("standard_deduction", amount)?;
        }
        for amount in self.child_tax_credit.phaseout_threshold.values() {
            non_negative("child_tax_credit.phaseout_threshold", amount)?;
        }
        non_negative(
            "child_tax_credit.amount_per_child",
            self.child_tax_credit.amount_per_child,
        )?;
        non_negative(
            "child_tax_credit.phaseout_reduction_per_step",
            self.child_tax_credit.phaseout_reduction_per_step,
        )?;
        if self.child_tax_credit.phaseout_step <= Decimal::ZERO {
            return Err(TablesError::OutOfRange {
                field: "child_tax_credit.phaseout_step",
                expectation: "positive",
                value: self.child_tax_credit.phaseout_step,
            });
        }
        for state in &self.states {
            if state.rate < Decimal::ZERO || state.rate > Decimal::ONE {
                return Err(TablesError::OutOfRange {
                    field: "state.rate",
                    expectation: "between 0 and 1",
                    value: state.rate,
                });
            }
        }
        Ok(())
    }
}

fn non_negative(
    field: &'static str,
    value: Decimal,
) -> Result<(), TablesError> {
    if value < Decimal::ZERO {
        return Err(TablesError::OutOfRange {
            field,
            expectation: "non-negative",
            value,
        });
    }
    Ok(())
}
