//! Scenario recomputation.
//!
//! [`ScenarioEngine::recompute`] runs the full pipeline for one request:
//!
//! 1. Normalize the intake filing status for both services.
//! 2. Derive the baseline AGI (or take the caller's override).
//! 3. Apply the taxable-income delta range to it, clamped at zero.
//! 4. Evaluate federal, state and total tax at each of the three points.
//! 5. Assemble the tax delta against the baseline.
//!
//! The engine owns nothing but its two services and a tax year; every call
//! is independent of every other.
//!
//! [`ScenarioEngine::report`] runs the same pipeline and also returns the
//! [`BaselineAgi`] the deltas were applied to. The assumption sits beside
//! the [`ScenarioResult`], not inside it, so an override equal to the
//! derived AGI produces an identical result.
//!
//! # Example
//!
//! ```
//! use rust_decimal::Decimal;
//! use rust_decimal_macros::dec;
//! use scenario_core::services::{
//!     FederalTaxInput, FederalTaxOutput, FederalTaxService, StateTaxInput, StateTaxOutput,
//!     StateTaxService, TaxServiceError,
//! };
//! use scenario_core::{
//!     FederalFilingStatus, FilingStatus, Money, Range, ScenarioEngine, ScenarioRequest, StateCode,
//! };
//!
//! struct TenPercent;
//!
//! impl FederalTaxService for TenPercent {
//!     fn compute_federal_baseline(
//!         &self,
//!         input: &FederalTaxInput,
//!     ) -> Result<FederalTaxOutput, TaxServiceError> {
//!         Ok(FederalTaxOutput {
//!             income_tax_after_ctc: input.taxable_ordinary_income_after_deduction * dec!(0.10),
//!         })
//!     }
//!
//!     fn standard_deduction(&self, _: FederalFilingStatus) -> Result<Money, TaxServiceError> {
//!         Ok(dec!(15000))
//!     }
//! }
//!
//! struct NoStateTax;
//!
//! impl StateTaxService for NoStateTax {
//!     fn compute_state_income_tax(
//!         &self,
//!         _: &StateTaxInput,
//!     ) -> Result<StateTaxOutput, TaxServiceError> {
//!         Ok(StateTaxOutput { state_income_tax: Decimal::ZERO })
//!     }
//! }
//!
//! let engine = ScenarioEngine::new(TenPercent, NoStateTax, 2025);
//! let state = StateCode::new("TX").unwrap();
//! let baseline = engine
//!     .compute_baseline(FilingStatus::Single, state, dec!(100000), 0)
//!     .unwrap();
//!
//! let result = engine
//!     .recompute(&ScenarioRequest {
//!         baseline,
//!         filing_status: FilingStatus::Single,
//!         state,
//!         taxable_income_delta: Range::new(dec!(-30000), dec!(-20000), dec!(-10000)),
//!         qualifying_children_under_17: 0,
//!         agi_override: None,
//!     })
//!     .unwrap();
//!
//! assert_eq!(result.revised.total_tax(), dec!(8000.00));
//! assert_eq!(result.total_tax_delta, Range::new(dec!(3000.00), dec!(2000.00), dec!(1000.00)));
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::agi_proxy::{BaselineAgi, derive_baseline_agi};
use crate::calculations::common::{checked_sum, clamp_non_negative};
use crate::calculations::delta::assemble;
use crate::calculations::evaluator::ScenarioEvaluator;
use crate::calculations::normalizer::{NormalizedFilingStatus, normalize};
use crate::calculations::range_propagation::propagate_range;
use crate::error::ScenarioError;
use crate::models::{FilingStatus, Money, Range, StateCode, Totals};
use crate::services::{FederalTaxService, StateTaxService};

/// One recomputation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioRequest {
    /// Current-law position the scenario is measured against.
    pub baseline: Totals,
    pub filing_status: FilingStatus,
    pub state: StateCode,
    /// Hypothetical change in taxable income at each point.
    pub taxable_income_delta: Range<Money>,
    #[serde(default)]
    pub qualifying_children_under_17: u32,
    /// True AGI, when known. Otherwise AGI is approximated from taxable
    /// income and the standard deduction.
    #[serde(default)]
    pub agi_override: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub baseline: Totals,
    /// The base point of `revised_range`.
    pub revised: Totals,
    pub revised_range: Range<Totals>,
    /// `baseline.total_tax − revised.total_tax`; positive means less tax.
    pub total_tax_delta: Range<Money>,
    /// The requested taxable-income delta, unchanged.
    pub total_taxable_income_delta: Range<Money>,
}

/// A [`ScenarioResult`] together with the baseline AGI assumption behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    #[serde(flatten)]
    pub result: ScenarioResult,
    /// The AGI the deltas were applied to, and how it was obtained.
    pub baseline_agi: BaselineAgi,
}

/// Recomputes tax positions against a federal and a state service.
#[derive(Debug, Clone)]
pub struct ScenarioEngine<F, S> {
    federal: F,
    state: S,
    tax_year: i32,
}

impl<F, S> ScenarioEngine<F, S>
where
    F: FederalTaxService,
    S: StateTaxService,
{
    pub fn new(
        federal: F,
        state: S,
        tax_year: i32,
    ) -> Self {
        Self {
            federal,
            state,
            tax_year,
        }
    }

    pub fn tax_year(&self) -> i32 {
        self.tax_year
    }

    /// Recomputes the revised position for a taxable-income delta range.
    ///
    /// # Errors
    ///
    /// * [`ScenarioError::UnknownFilingStatus`] if the status has no
    ///   federal or state translation.
    /// * [`ScenarioError::Federal`] / [`ScenarioError::State`] carrying the
    ///   service's own error if any of the three points fails. No partial
    ///   result is returned.
    /// * [`ScenarioError::Overflow`] if an AGI point, a total or a delta
    ///   cannot be represented.
    pub fn recompute(
        &self,
        request: &ScenarioRequest,
    ) -> Result<ScenarioResult, ScenarioError> {
        self.report(request).map(|report| report.result)
    }

    /// [`ScenarioEngine::recompute`], plus the baseline AGI it used.
    ///
    /// # Errors
    ///
    /// As [`ScenarioEngine::recompute`].
    pub fn report(
        &self,
        request: &ScenarioRequest,
    ) -> Result<ScenarioReport, ScenarioError> {
        let filing_status = normalize(request.filing_status)?;
        let standard_deduction = self.standard_deduction(&filing_status)?;

        let baseline_agi =
            derive_baseline_agi(&request.baseline, standard_deduction, request.agi_override)?;
        let agi_range = propagate_range(baseline_agi.agi, &request.taxable_income_delta)?;

        debug!(
            filing_status = %filing_status.intake,
            state = %request.state,
            baseline_agi = %baseline_agi.agi,
            agi_approximated = baseline_agi.is_approximation(),
            agi_low = %agi_range.low,
            agi_base = %agi_range.base,
            agi_high = %agi_range.high,
            "recomputing scenario"
        );

        let revised_range = self
            .evaluator(
                request.state,
                filing_status,
                standard_deduction,
                request.qualifying_children_under_17,
            )
            .evaluate_range(&agi_range)?;

        let result = assemble(
            request.baseline,
            revised_range,
            request.taxable_income_delta,
        )?;

        Ok(ScenarioReport {
            result,
            baseline_agi,
        })
    }

    /// Computes a current-law baseline from normalized intake.
    ///
    /// AGI is taken as `taxable_income + standard_deduction`, the same
    /// approximation [`ScenarioEngine::recompute`] uses, so a zero delta
    /// against this baseline reproduces it exactly.
    pub fn compute_baseline(
        &self,
        filing_status: FilingStatus,
        state: StateCode,
        taxable_income: Money,
        qualifying_children_under_17: u32,
    ) -> Result<Totals, ScenarioError> {
        let filing_status = normalize(filing_status)?;
        let standard_deduction = self.standard_deduction(&filing_status)?;
        let agi = clamp_non_negative(checked_sum(
            clamp_non_negative(taxable_income),
            standard_deduction,
            "baseline AGI",
        )?);

        self.evaluator(
            state,
            filing_status,
            standard_deduction,
            qualifying_children_under_17,
        )
        .evaluate_point(agi)
    }

    fn standard_deduction(
        &self,
        filing_status: &NormalizedFilingStatus,
    ) -> Result<Money, ScenarioError> {
        self.federal
            .standard_deduction(filing_status.federal)
            .map_err(ScenarioError::Federal)
    }

    fn evaluator(
        &self,
        state: StateCode,
        filing_status: NormalizedFilingStatus,
        standard_deduction: Money,
        qualifying_children_under_17: u32,
    ) -> ScenarioEvaluator<'_, F, S> {
        ScenarioEvaluator::new(
            &self.federal,
            &self.state,
            self.tax_year,
            state,
            filing_status,
            standard_deduction,
            qualifying_children_under_17,
        )
    }
}

/// One-shot form of [`ScenarioEngine::recompute`] over borrowed services.
pub fn recompute_scenario<F, S>(
    federal: &F,
    state: &S,
    tax_year: i32,
    request: &ScenarioRequest,
) -> Result<ScenarioResult, ScenarioError>
where
    F: FederalTaxService + ?Sized,
    S: StateTaxService + ?Sized,
{
    ScenarioEngine::new(federal, state, tax_year).recompute(request)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::agi_proxy::AgiSource;
    use crate::error::ErrorKind;
    use crate::models::FederalFilingStatus;
    use crate::services::{
        FederalTaxInput, FederalTaxOutput, StateTaxInput, StateTaxOutput, TaxServiceError,
    };

    // ── stub services ────────────────────────────────────────────────────
    // Federal: 20% of taxable income, less a $2,000 credit per child that
    // phases out by 5% of AGI above $200,000; the credit cannot exceed the
    // tax. Standard deduction $15,000 (S) / $30,000 (MFJ).
    // State: 4.4% of the taxable base, "TX" unsupported.

    struct StubFederal;

    impl FederalTaxService for StubFederal {
        fn compute_federal_baseline(
            &self,
            input: &FederalTaxInput,
        ) -> Result<FederalTaxOutput, TaxServiceError> {
            if input.agi < Decimal::ZERO {
                return Err(TaxServiceError::InvalidInput {
                    field: "agi",
                    value: input.agi,
                });
            }
            let tax = input.taxable_ordinary_income_after_deduction * dec!(0.20);
            let reduction = clamp_non_negative(input.agi - dec!(200000)) * dec!(0.05);
            let credit = clamp_non_negative(
                Decimal::from(input.qualifying_children_under_17) * dec!(2000) - reduction,
            );
            Ok(FederalTaxOutput {
                income_tax_after_ctc: tax - credit.min(tax),
            })
        }

        fn standard_deduction(
            &self,
            filing_status: FederalFilingStatus,
        ) -> Result<Money, TaxServiceError> {
            match filing_status {
                FederalFilingStatus::MarriedFilingJointly => Ok(dec!(30000)),
                _ => Ok(dec!(15000)),
            }
        }
    }

    struct StubState;

    impl StateTaxService for StubState {
        fn compute_state_income_tax(
            &self,
            input: &StateTaxInput,
        ) -> Result<StateTaxOutput, TaxServiceError> {
            if input.state.as_str() == "TX" {
                return Err(TaxServiceError::UnsupportedJurisdiction("TX".to_string()));
            }
            Ok(StateTaxOutput {
                state_income_tax: input.taxable_base * dec!(0.044),
            })
        }
    }

    fn engine() -> ScenarioEngine<StubFederal, StubState> {
        ScenarioEngine::new(StubFederal, StubState, 2025)
    }

    fn colorado() -> StateCode {
        StateCode::new("CO").unwrap()
    }

    fn request(
        baseline: Totals,
        delta: Range<Money>,
    ) -> ScenarioRequest {
        ScenarioRequest {
            baseline,
            filing_status: FilingStatus::Single,
            state: colorado(),
            taxable_income_delta: delta,
            qualifying_children_under_17: 0,
            agi_override: None,
        }
    }

    // =========================================================================
    // recompute tests
    // =========================================================================

    #[test]
    fn recompute_applies_delta_to_derived_agi() {
        let baseline = Totals::new(dec!(70000), dec!(20000), dec!(400000));
        let delta = Range::new(dec!(-50000), dec!(-30000), dec!(-10000));

        let report = engine().report(&request(baseline, delta)).unwrap();
        let result = report.result;

        assert_eq!(report.baseline_agi.agi, dec!(415000));
        assert_eq!(result.revised_range.low.taxable_income(), dec!(350000));
        assert_eq!(result.revised_range.base.taxable_income(), dec!(370000));
        assert_eq!(result.revised_range.high.taxable_income(), dec!(390000));
        // 370000 × 20% + 370000 × 4.4%
        assert_eq!(result.revised.total_tax(), dec!(90280.000));
        assert_eq!(result.total_tax_delta.base, dec!(-280.000));
        assert_eq!(result.total_taxable_income_delta, delta);
    }

    #[test]
    fn recompute_zero_delta_reproduces_computed_baseline() {
        let baseline = engine()
            .compute_baseline(FilingStatus::Single, colorado(), dec!(85000), 0)
            .unwrap();

        let result = engine()
            .recompute(&request(baseline, Range::splat(Decimal::ZERO)))
            .unwrap();

        assert_eq!(result.revised, baseline);
        assert_eq!(result.revised_range, Range::splat(baseline));
        assert_eq!(result.total_tax_delta, Range::splat(Decimal::ZERO));
    }

    #[test]
    fn recompute_uses_override_instead_of_derivation() {
        let baseline = Totals::new(dec!(0), dec!(0), dec!(100000));
        let mut req = request(baseline, Range::splat(Decimal::ZERO));
        req.agi_override = Some(dec!(125000));

        let report = engine().report(&req).unwrap();

        assert_eq!(report.baseline_agi.source, AgiSource::Override { supplied: dec!(125000) });
        assert_eq!(report.result.revised.taxable_income(), dec!(110000));
    }

    #[test]
    fn recompute_clamps_agi_at_zero() {
        let baseline = Totals::new(dec!(0), dec!(0), dec!(10000));
        let delta = Range::new(dec!(-1000000), dec!(-25000), dec!(0));

        let result = engine().recompute(&request(baseline, delta)).unwrap();

        assert_eq!(result.revised_range.low.taxable_income(), Decimal::ZERO);
        assert_eq!(result.revised_range.low.total_tax(), Decimal::ZERO);
        assert_eq!(result.revised_range.base.taxable_income(), Decimal::ZERO);
        assert_eq!(result.total_taxable_income_delta.low, dec!(-1000000));
    }

    #[test]
    fn recompute_uses_status_specific_standard_deduction() {
        let baseline = Totals::new(dec!(0), dec!(0), dec!(100000));
        let mut req = request(baseline, Range::splat(Decimal::ZERO));
        req.filing_status = FilingStatus::MarriedFilingJointly;

        let report = engine().report(&req).unwrap();

        assert_eq!(report.baseline_agi.agi, dec!(130000));
        assert_eq!(report.result.revised.taxable_income(), dec!(100000));
    }

    #[test]
    fn recompute_fails_whole_range_when_state_is_unsupported() {
        let baseline = Totals::new(dec!(0), dec!(0), dec!(100000));
        let mut req = request(baseline, Range::splat(Decimal::ZERO));
        req.state = StateCode::new("TX").unwrap();

        let result = engine().recompute(&req);

        assert_eq!(
            result,
            Err(ScenarioError::State(TaxServiceError::UnsupportedJurisdiction(
                "TX".to_string()
            )))
        );
    }

    #[test]
    fn recompute_with_matching_override_is_identical() {
        let baseline = Totals::new(dec!(20000), dec!(4400), dec!(100000));
        let delta = Range::new(dec!(-10000), dec!(0), dec!(10000));
        let derived = request(baseline, delta);
        let mut overridden = derived.clone();
        overridden.agi_override = Some(dec!(115000));

        let a = engine().recompute(&derived).unwrap();
        let b = engine().recompute(&overridden).unwrap();

        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn report_keeps_agi_provenance_beside_the_result() {
        let baseline = Totals::new(dec!(20000), dec!(4400), dec!(100000));
        let req = request(baseline, Range::splat(Decimal::ZERO));

        let report = engine().report(&req).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(report.result, engine().recompute(&req).unwrap());
        assert_eq!(json["baseline_agi"]["source"], "derived");
        assert_eq!(json["baseline_agi"]["agi"], "115000");
        assert!(json["revised_range"].is_object());
    }

    #[test]
    fn recompute_reports_overflow_instead_of_panicking() {
        let baseline = Totals::new(dec!(0), dec!(0), dec!(1));
        let req = request(baseline, Range::splat(Decimal::MAX));

        let result = engine().recompute(&req);

        assert_eq!(
            result,
            Err(ScenarioError::Overflow {
                operation: "scenario AGI"
            })
        );
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Computation);
    }

    #[test]
    fn recompute_is_deterministic() {
        let baseline = Totals::new(dec!(70000), dec!(20000), dec!(400000));
        let delta = Range::new(dec!(-50000.37), dec!(-30000.11), dec!(-10000.01));
        let req = request(baseline, delta);

        let first = engine().recompute(&req).unwrap();
        let second = engine().recompute(&req).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    // =========================================================================
    // compute_baseline tests
    // =========================================================================

    #[test]
    fn compute_baseline_applies_child_credit() {
        let without = engine()
            .compute_baseline(FilingStatus::Single, colorado(), dec!(85000), 0)
            .unwrap();
        let with_two = engine()
            .compute_baseline(FilingStatus::Single, colorado(), dec!(85000), 2)
            .unwrap();

        assert_eq!(without.federal_tax() - with_two.federal_tax(), dec!(4000));
        assert_eq!(without.state_tax(), with_two.state_tax());
    }

    #[test]
    fn compute_baseline_reports_overflow() {
        let result = engine().compute_baseline(FilingStatus::Single, colorado(), Decimal::MAX, 0);

        assert_eq!(
            result,
            Err(ScenarioError::Overflow {
                operation: "baseline AGI"
            })
        );
    }

    #[test]
    fn compute_baseline_clamps_negative_taxable_income() {
        let totals = engine()
            .compute_baseline(FilingStatus::Single, colorado(), dec!(-500), 0)
            .unwrap();

        assert_eq!(totals.taxable_income(), Decimal::ZERO);
        assert_eq!(totals.total_tax(), Decimal::ZERO);
    }

    // =========================================================================
    // recompute_scenario tests
    // =========================================================================

    #[test]
    fn recompute_scenario_accepts_trait_objects() {
        let federal: &dyn FederalTaxService = &StubFederal;
        let state: &dyn StateTaxService = &StubState;
        let baseline = Totals::new(dec!(0), dec!(0), dec!(50000));

        let result =
            recompute_scenario(federal, state, 2025, &request(baseline, Range::splat(dec!(1000))))
                .unwrap();

        assert_eq!(result.revised.taxable_income(), dec!(51000));
    }

    #[test]
    fn request_deserializes_with_defaults() {
        let json = r#"{
            "baseline": {"federal_tax": 70000, "state_tax": 20000, "total_tax": 90000, "taxable_income": 400000},
            "filing_status": "SINGLE",
            "state": "CO",
            "taxable_income_delta": {"low": -50000, "base": -30000, "high": -10000}
        }"#;

        let req: ScenarioRequest = serde_json::from_str(json).unwrap();

        assert_eq!(req.qualifying_children_under_17, 0);
        assert_eq!(req.agi_override, None);
        assert_eq!(req.baseline.total_tax(), dec!(90000));
    }
}
