//! Baseline AGI derivation.
//!
//! Credit phaseouts are keyed on AGI, but a baseline usually arrives with
//! taxable income only. Absent a real AGI the engine approximates it as
//! taxable income plus the standard deduction. Above-the-line adjustments
//! are invisible to that approximation, so callers who know the true AGI
//! pass it as an override and the result records which path was taken.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculations::common::{checked_sum, clamp_non_negative};
use crate::error::ScenarioError;
use crate::models::{Money, Totals};

/// Where a baseline AGI figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum AgiSource {
    /// Approximated as `taxable_income + standard_deduction`.
    Derived {
        taxable_income: Money,
        standard_deduction: Money,
    },
    /// Supplied by the caller.
    Override { supplied: Money },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineAgi {
    pub agi: Money,
    #[serde(flatten)]
    pub source: AgiSource,
}

impl BaselineAgi {
    pub fn is_approximation(&self) -> bool {
        matches!(self.source, AgiSource::Derived { .. })
    }
}

/// Derives the baseline AGI the scenario deltas are applied to.
///
/// The result is never negative. A negative override is clamped to zero
/// and logged.
///
/// # Errors
///
/// Returns [`ScenarioError::Overflow`] if the derived sum cannot be
/// represented.
pub fn derive_baseline_agi(
    baseline: &Totals,
    standard_deduction: Money,
    agi_override: Option<Money>,
) -> Result<BaselineAgi, ScenarioError> {
    let agi = match agi_override {
        Some(supplied) => {
            if supplied < Decimal::ZERO {
                warn!(supplied = %supplied, "negative AGI override clamped to zero");
            }
            BaselineAgi {
                agi: clamp_non_negative(supplied),
                source: AgiSource::Override { supplied },
            }
        }
        None => {
            let taxable_income = baseline.taxable_income();
            let sum = checked_sum(taxable_income, standard_deduction, "baseline AGI")?;
            BaselineAgi {
                agi: clamp_non_negative(sum),
                source: AgiSource::Derived {
                    taxable_income,
                    standard_deduction,
                },
            }
        }
    };
    Ok(agi)
}
