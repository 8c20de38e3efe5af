//! Common utility functions for tax calculations.
//!
//! This module provides shared numeric helpers used by the scenario
//! components and by tax service implementations.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::ScenarioError;
use crate::models::Money;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// This follows standard financial rounding conventions where values at exactly
/// 0.005 are rounded up to 0.01 (away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use scenario_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Clamps an income-bearing amount to the non-negative domain.
///
/// Tax functions are only defined for non-negative income, so every
/// arithmetic step that could take income below zero goes through here.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use scenario_core::calculations::common::clamp_non_negative;
///
/// assert_eq!(clamp_non_negative(dec!(125.50)), dec!(125.50));
/// assert_eq!(clamp_non_negative(dec!(-0.01)), dec!(0));
/// ```
pub fn clamp_non_negative(value: Money) -> Money {
    if value < Decimal::ZERO {
        Decimal::ZERO
    } else {
        value
    }
}

/// `lhs + rhs`, or [`ScenarioError::Overflow`] naming `operation`.
pub fn checked_sum(
    lhs: Money,
    rhs: Money,
    operation: &'static str,
) -> Result<Money, ScenarioError> {
    lhs.checked_add(rhs)
        .ok_or(ScenarioError::Overflow { operation })
}

/// `lhs − rhs`, or [`ScenarioError::Overflow`] naming `operation`.
pub fn checked_difference(
    lhs: Money,
    rhs: Money,
    operation: &'static str,
) -> Result<Money, ScenarioError> {
    lhs.checked_sub(rhs)
        .ok_or(ScenarioError::Overflow { operation })
}
