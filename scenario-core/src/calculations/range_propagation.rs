//! Applies a three-point delta to a baseline amount.

use tracing::warn;

use crate::calculations::common::{checked_sum, clamp_non_negative};
use crate::error::ScenarioError;
use crate::models::{Money, Range};

/// Returns `clamp0(base + delta)` for each point of `delta`.
///
/// Clamping can collapse distinct points onto zero, and a delta that was
/// not ordered to begin with stays unordered. The points are passed through
/// as computed and never re-sorted; a warning is logged when the output is
/// out of order.
///
/// # Errors
///
/// Returns [`ScenarioError::Overflow`] if any `base + delta` cannot be
/// represented.
pub fn propagate_range(
    base: Money,
    delta: &Range<Money>,
) -> Result<Range<Money>, ScenarioError> {
    let points = delta.try_map(|d| {
        checked_sum(base, d, "scenario AGI").map(clamp_non_negative)
    })?;

    if !points.is_ordered() {
        warn!(
            low = %points.low,
            base = %points.base,
            high = %points.high,
            "propagated range is not ordered low <= base <= high"
        );
    }

    Ok(points)
}
