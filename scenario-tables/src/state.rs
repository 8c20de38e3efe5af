//! Flat-rate state income tax service.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use scenario_core::calculations::common::round_half_up;
use scenario_core::services::{StateTaxInput, StateTaxOutput, StateTaxService};
use scenario_core::{StateCode, TaxServiceError};
use tracing::debug;

use crate::config::StateRateConfig;
use crate::error::TablesError;

/// Applies one flat rate per state to the taxable base.
///
/// Filing status does not change a flat rate, so it is accepted but unused.
#[derive(Debug, Clone)]
pub struct TableStateService {
    tax_year: i32,
    rates: BTreeMap<StateCode, Decimal>,
}

impl TableStateService {
    /// Builds the rate table.
    ///
    /// # Errors
    ///
    /// * [`TablesError::UnknownState`] for a code that is not a US
    ///   jurisdiction.
    /// * [`TablesError::DuplicateState`] if a state is listed twice.
    pub fn new(
        tax_year: i32,
        states: &[StateRateConfig],
    ) -> Result<Self, TablesError> {
        let mut rates = BTreeMap::new();
        for state in states {
            let code = StateCode::new(&state.code)
                .map_err(|_| TablesError::UnknownState(state.code.clone()))?;
            if rates.insert(code, state.rate).is_some() {
                return Err(TablesError::DuplicateState(state.code.clone()));
            }
        }
        Ok(Self { tax_year, rates })
    }

    pub fn supported_states(&self) -> impl Iterator<Item = StateCode> + '_ {
        self.rates.keys().copied()
    }
}

impl StateTaxService for TableStateService {
    fn compute_state_income_tax(
        &self,
        input: &StateTaxInput,
    ) -> Result<StateTaxOutput, TaxServiceError> {
        if input.tax_year != self.tax_year {
            return Err(TaxServiceError::UnsupportedTaxYear {
                requested: input.tax_year,
                configured: self.tax_year,
            });
        }
        if input.taxable_base < Decimal::ZERO {
            return Err(TaxServiceError::InvalidInput {
                field: "taxable_base",
                value: input.taxable_base,
            });
        }
        let rate = self
            .rates
            .get(&input.state)
            .ok_or_else(|| TaxServiceError::UnsupportedJurisdiction(input.state.to_string()))?;

        let state_income_tax = round_half_up(input.taxable_base * *rate);

        debug!(
            state = %input.state,
            filing_status = %input.filing_status,
            taxable_base = %input.taxable_base,
            state_income_tax = %state_income_tax,
            "computed state income tax"
        );

        Ok(StateTaxOutput { state_income_tax })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use scenario_core::StateFilingStatus;

    use super::*;

    fn service() -> TableStateService {
        TableStateService::new(
            2025,
            &[
                StateRateConfig {
                    code: "CO".to_string(),
                    rate: dec!(0.044),
                },
                StateRateConfig {
                    code: "TX".to_string(),
                    rate: dec!(0),
                },
            ],
        )
        .unwrap()
    }

    fn input(
        state: &str,
        taxable_base: Decimal,
    ) -> StateTaxInput {
        StateTaxInput {
            tax_year: 2025,
            state: StateCode::new(state).unwrap(),
            filing_status: StateFilingStatus::Single,
            taxable_base,
        }
    }

    #[test]
    fn applies_flat_rate_rounded_to_cents() {
        let result = service().compute_state_income_tax(&input("CO", dec!(85000.55)));

        // 85000.55 × 0.044 = 3740.0242
        assert_eq!(result.unwrap().state_income_tax, dec!(3740.02));
    }

    #[test]
    fn zero_rate_state_owes_nothing() {
        let result = service().compute_state_income_tax(&input("TX", dec!(500000)));

        assert_eq!(result.unwrap().state_income_tax, dec!(0));
    }

    #[test]
    fn unlisted_state_is_unsupported() {
        let result = service().compute_state_income_tax(&input("CA", dec!(1000)));

        assert_eq!(
            result,
            Err(TaxServiceError::UnsupportedJurisdiction("CA".to_string()))
        );
    }

    #[test]
    fn other_tax_year_is_unsupported() {
        let mut request = input("CO", dec!(1000));
        request.tax_year = 2024;

        let result = service().compute_state_income_tax(&request);

        assert_eq!(
            result,
            Err(TaxServiceError::UnsupportedTaxYear {
                requested: 2024,
                configured: 2025,
            })
        );
    }

    #[test]
    fn negative_base_is_rejected() {
        let result = service().compute_state_income_tax(&input("CO", dec!(-0.01)));

        assert!(matches!(result, Err(TaxServiceError::InvalidInput { .. })));
    }

    #[test]
    fn new_rejects_duplicates_and_unknown_codes() {
        let duplicate = TableStateService::new(
            2025,
            &[
                StateRateConfig {
                    code: "CO".to_string(),
                    rate: dec!(0.044),
                },
                StateRateConfig {
                    code: "CO".to_string(),
                    rate: dec!(0.05),
                },
            ],
        );
        let unknown = TableStateService::new(
            2025,
            &[StateRateConfig {
                code: "XX".to_string(),
                rate: dec!(0.01),
            }],
        );

        assert!(matches!(duplicate, Err(TablesError::DuplicateState(_))));
        assert!(matches!(unknown, Err(TablesError::UnknownState(_))));
    }
}
