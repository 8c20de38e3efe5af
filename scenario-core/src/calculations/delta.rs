//! Baseline-versus-revised delta assembly.

use crate::calculations::common::checked_difference;
use crate::engine::ScenarioResult;
use crate::error::ScenarioError;
use crate::models::{Money, Range, Totals};

/// Builds the result handed back to callers.
///
/// The taxable-income delta is passed through exactly as requested, even
/// where clamping meant the evaluated AGI moved by less.
pub fn assemble(
    baseline: Totals,
    revised_range: Range<Totals>,
    taxable_income_delta: Range<Money>,
) -> Result<ScenarioResult, ScenarioError> {
    Ok(ScenarioResult {
        baseline,
        revised: revised_range.base,
        total_tax_delta: total_tax_delta(&baseline, &revised_range)?,
        revised_range,
        total_taxable_income_delta: taxable_income_delta,
    })
}

/// `baseline.total_tax − revised.total_tax` at each point.
///
/// Positive means the scenario lowers tax. Not clamped: a negative value is
/// a tax increase and must reach the caller as such.
pub fn total_tax_delta(
    baseline: &Totals,
    revised: &Range<Totals>,
) -> Result<Range<Money>, ScenarioError> {
    revised.as_ref().try_map(|totals| {
        checked_difference(baseline.total_tax(), totals.total_tax(), "total tax delta")
    })
}
