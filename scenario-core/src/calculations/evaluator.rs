//! Scenario tax evaluation.
//!
//! Turns AGI points into [`Totals`] by running each one through the federal
//! and state services:
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Taxable income = AGI − standard deduction, minimum 0 |
//! | 2    | Federal income tax after CTC (preferential income fixed at 0) |
//! | 3    | State income tax on the same taxable income |
//! | 4    | Total tax = federal + state |
//!
//! Service errors are never replaced by a default figure. A range is
//! evaluated as a unit: if any point fails, no point is returned.

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{checked_difference, clamp_non_negative};
use crate::calculations::normalizer::NormalizedFilingStatus;
use crate::error::ScenarioError;
use crate::models::{Money, Range, StateCode, Totals};
use crate::services::{FederalTaxInput, FederalTaxService, StateTaxInput, StateTaxService};

/// Evaluates AGI points for one taxpayer profile.
///
/// Borrows its services; holds no state that changes between calls.
pub struct ScenarioEvaluator<'a, F: ?Sized, S: ?Sized> {
    federal: &'a F,
    state: &'a S,
    tax_year: i32,
    state_code: StateCode,
    filing_status: NormalizedFilingStatus,
    standard_deduction: Money,
    qualifying_children_under_17: u32,
}

impl<'a, F, S> ScenarioEvaluator<'a, F, S>
where
    F: FederalTaxService + ?Sized,
    S: StateTaxService + ?Sized,
{
    pub fn new(
        federal: &'a F,
        state: &'a S,
        tax_year: i32,
        state_code: StateCode,
        filing_status: NormalizedFilingStatus,
        standard_deduction: Money,
        qualifying_children_under_17: u32,
    ) -> Self {
        Self {
            federal,
            state,
            tax_year,
            state_code,
            filing_status,
            standard_deduction,
            qualifying_children_under_17,
        }
    }

    /// Evaluates all three points of an AGI range.
    ///
    /// # Errors
    ///
    /// Returns the first service error encountered, wrapped in
    /// [`ScenarioError::Federal`] or [`ScenarioError::State`].
    pub fn evaluate_range(
        &self,
        agi: &Range<Money>,
    ) -> Result<Range<Totals>, ScenarioError> {
        agi.try_map(|point| self.evaluate_point(point))
    }

    /// Evaluates one AGI point.
    pub fn evaluate_point(
        &self,
        agi: Money,
    ) -> Result<Totals, ScenarioError> {
        let taxable_income = self.taxable_income(agi)?;

        let federal_tax = self.federal_tax(agi, taxable_income)?;
        let state_tax = self.state_tax(taxable_income)?;

        let totals = Totals::try_new(federal_tax, state_tax, taxable_income)?;

        debug!(
            agi = %agi,
            taxable_income = %taxable_income,
            federal_tax = %federal_tax,
            state_tax = %state_tax,
            total_tax = %totals.total_tax(),
            "evaluated scenario point"
        );

        Ok(totals)
    }

    fn taxable_income(
        &self,
        agi: Money,
    ) -> Result<Money, ScenarioError> {
        checked_difference(agi, self.standard_deduction, "taxable income").map(clamp_non_negative)
    }

    fn federal_tax(
        &self,
        agi: Money,
        taxable_income: Money,
    ) -> Result<Money, ScenarioError> {
        let input = FederalTaxInput {
            filing_status: self.filing_status.federal,
            agi,
            taxable_ordinary_income_after_deduction: taxable_income,
            taxable_preferential_income_after_deduction: Decimal::ZERO,
            qualifying_children_under_17: self.qualifying_children_under_17,
        };

        self.federal
            .compute_federal_baseline(&input)
            .map(|output| output.income_tax_after_ctc)
            .map_err(ScenarioError::Federal)
    }

    fn state_tax(
        &self,
        taxable_income: Money,
    ) -> Result<Money, ScenarioError> {
        let input = StateTaxInput {
            tax_year: self.tax_year,
            state: self.state_code,
            filing_status: self.filing_status.state,
            taxable_base: taxable_income,
        };

        self.state
            .compute_state_income_tax(&input)
            .map(|output| output.state_income_tax)
            .map_err(ScenarioError::State)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::normalizer::normalize;
    use crate::models::{FederalFilingStatus, FilingStatus, StateFilingStatus};
    use crate::services::{FederalTaxOutput, StateTaxOutput, TaxServiceError};

    // ── stub services ────────────────────────────────────────────────────
    // Federal: 10% of taxable income, less $1,000 per child, floored at 0.
    // State: 5% of the taxable base. Both record what they were asked.

    #[derive(Default)]
    struct RecordingFederal {
        calls: Mutex<Vec<FederalTaxInput>>,
        reject_agi_above: Option<Money>,
    }

    impl FederalTaxService for RecordingFederal {
        fn compute_federal_baseline(
            &self,
            input: &FederalTaxInput,
        ) -> Result<FederalTaxOutput, TaxServiceError> {
            self.calls.lock().unwrap().push(input.clone());
            if let Some(limit) = self.reject_agi_above {
                if input.agi > limit {
                    return Err(TaxServiceError::InvalidInput {
                        field: "agi",
                        value: input.agi,
                    });
                }
            }
            let tax = input.taxable_ordinary_income_after_deduction * dec!(0.10)
                - Decimal::from(input.qualifying_children_under_17) * dec!(1000);
            Ok(FederalTaxOutput {
                income_tax_after_ctc: clamp_non_negative(tax),
            })
        }

        fn standard_deduction(
            &self,
            _filing_status: FederalFilingStatus,
        ) -> Result<Money, TaxServiceError> {
            Ok(dec!(15000))
        }
    }

    #[derive(Default)]
    struct RecordingState {
        calls: Mutex<Vec<StateTaxInput>>,
    }

    impl StateTaxService for RecordingState {
        fn compute_state_income_tax(
            &self,
            input: &StateTaxInput,
        ) -> Result<StateTaxOutput, TaxServiceError> {
            self.calls.lock().unwrap().push(input.clone());
            Ok(StateTaxOutput {
                state_income_tax: input.taxable_base * dec!(0.05),
            })
        }
    }

    fn evaluator<'a>(
        federal: &'a RecordingFederal,
        state: &'a RecordingState,
        children: u32,
    ) -> ScenarioEvaluator<'a, RecordingFederal, RecordingState> {
        ScenarioEvaluator::new(
            federal,
            state,
            2025,
            StateCode::new("CO").unwrap(),
            normalize(FilingStatus::MarriedFilingJointly).unwrap(),
            dec!(15000),
            children,
        )
    }

    // =========================================================================
    // evaluate_point tests
    // =========================================================================

    #[test]
    fn evaluate_point_subtracts_standard_deduction() {
        let federal = RecordingFederal::default();
        let state = RecordingState::default();

        let totals = evaluator(&federal, &state, 0).evaluate_point(dec!(115000)).unwrap();

        assert_eq!(totals.taxable_income(), dec!(100000));
        assert_eq!(totals.federal_tax(), dec!(10000.00));
        assert_eq!(totals.state_tax(), dec!(5000.00));
        assert_eq!(totals.total_tax(), dec!(15000.00));
    }

    #[test]
    fn evaluate_point_clamps_taxable_income_below_deduction() {
        let federal = RecordingFederal::default();
        let state = RecordingState::default();

        let totals = evaluator(&federal, &state, 0).evaluate_point(dec!(9000)).unwrap();

        assert_eq!(totals.taxable_income(), Decimal::ZERO);
        assert_eq!(totals.total_tax(), Decimal::ZERO);
    }

    #[test]
    fn evaluate_point_sends_normalized_codes_and_zero_preferential_income() {
        let federal = RecordingFederal::default();
        let state = RecordingState::default();

        evaluator(&federal, &state, 2).evaluate_point(dec!(65000)).unwrap();

        let federal_calls = federal.calls.lock().unwrap();
        assert_eq!(
            federal_calls[0],
            FederalTaxInput {
                filing_status: FederalFilingStatus::MarriedFilingJointly,
                agi: dec!(65000),
                taxable_ordinary_income_after_deduction: dec!(50000),
                taxable_preferential_income_after_deduction: Decimal::ZERO,
                qualifying_children_under_17: 2,
            }
        );
        let state_calls = state.calls.lock().unwrap();
        assert_eq!(
            state_calls[0],
            StateTaxInput {
                tax_year: 2025,
                state: StateCode::new("CO").unwrap(),
                filing_status: StateFilingStatus::Joint,
                taxable_base: dec!(50000),
            }
        );
    }

    #[test]
    fn evaluate_point_propagates_federal_error_unmodified() {
        let federal = RecordingFederal {
            reject_agi_above: Some(dec!(0)),
            ..Default::default()
        };
        let state = RecordingState::default();

        let result = evaluator(&federal, &state, 0).evaluate_point(dec!(1));

        assert_eq!(
            result,
            Err(ScenarioError::Federal(TaxServiceError::InvalidInput {
                field: "agi",
                value: dec!(1),
            }))
        );
        assert!(state.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn evaluate_point_reports_unrepresentable_total() {
        struct Saturated;

        impl StateTaxService for Saturated {
            fn compute_state_income_tax(
                &self,
                _input: &StateTaxInput,
            ) -> Result<StateTaxOutput, TaxServiceError> {
                Ok(StateTaxOutput {
                    state_income_tax: Decimal::MAX,
                })
            }
        }

        let federal = RecordingFederal::default();
        let result = ScenarioEvaluator::new(
            &federal,
            &Saturated,
            2025,
            StateCode::new("CO").unwrap(),
            normalize(FilingStatus::Single).unwrap(),
            dec!(15000),
            0,
        )
        .evaluate_point(dec!(115000));

        assert_eq!(
            result,
            Err(ScenarioError::Overflow {
                operation: "total tax"
            })
        );
    }

    // =========================================================================
    // evaluate_range tests
    // =========================================================================

    #[test]
    fn evaluate_range_computes_each_point() {
        let federal = RecordingFederal::default();
        let state = RecordingState::default();
        let agi = Range::new(dec!(15000), dec!(25000), dec!(35000));

        let totals = evaluator(&federal, &state, 0).evaluate_range(&agi).unwrap();

        assert_eq!(totals.low.total_tax(), dec!(0.00));
        assert_eq!(totals.base.total_tax(), dec!(1500.00));
        assert_eq!(totals.high.total_tax(), dec!(3000.00));
    }

    #[test]
    fn evaluate_range_fails_as_a_unit_when_high_point_fails() {
        let federal = RecordingFederal {
            reject_agi_above: Some(dec!(30000)),
            ..Default::default()
        };
        let state = RecordingState::default();
        let agi = Range::new(dec!(15000), dec!(25000), dec!(35000));

        let result = evaluator(&federal, &state, 0).evaluate_range(&agi);

        assert!(matches!(result, Err(ScenarioError::Federal(_))));
    }
}
