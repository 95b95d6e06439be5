//! Common utility functions for tax calculations.
//!
//! This module provides shared functionality used across the engine:
//! presentation rounding, clamping, and the one place where blank, negative or
//! oversized user-entered amounts are normalized.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::warn;

/// Largest amount accepted from a single entry. Larger values are clamped
/// so that sums across many forms stay within `Decimal` range.
pub const MAX_ENTERED_AMOUNT: Decimal = dec!(1_000_000_000_000_000);

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// This follows standard financial rounding conventions where values at exactly
/// 0.005 are rounded up to 0.01 (away from zero). The engine only applies it
/// to presented amounts, never to intermediate values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::max;
///
/// assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
/// assert_eq!(max(dec!(-100.00), dec!(-200.00)), dec!(-100.00));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Clamps a value at zero from below.
pub fn floor_zero(value: Decimal) -> Decimal {
    max(value, Decimal::ZERO)
}

/// Normalizes a user-entered amount: blank becomes zero, negative becomes
/// zero with a warning, and anything above [`MAX_ENTERED_AMOUNT`] is clamped
/// to it with a warning. `field` names the box in the log record.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use rust_decimal::Decimal;
/// use tax_core::calculations::common::{MAX_ENTERED_AMOUNT, amount};
///
/// assert_eq!(amount(None, "w2.wages"), dec!(0));
/// assert_eq!(amount(Some(dec!(-5)), "w2.wages"), dec!(0));
/// assert_eq!(amount(Some(dec!(12.5)), "w2.wages"), dec!(12.5));
/// assert_eq!(amount(Some(Decimal::MAX), "w2.wages"), MAX_ENTERED_AMOUNT);
/// ```
pub fn amount(
    value: Option<Decimal>,
    field: &'static str,
) -> Decimal {
    match value {
        None => Decimal::ZERO,
        Some(v) if v < Decimal::ZERO => {
            warn!(field, value = %v, "Negative amount entered; treating as zero");
            Decimal::ZERO
        }
        Some(v) if v > MAX_ENTERED_AMOUNT => {
            warn!(field, value = %v, "Amount above supported maximum; clamping");
            MAX_ENTERED_AMOUNT
        }
        Some(v) => v,
    }
}

/// Sums normalized amounts drawn from a list of line items. The total
/// saturates at `Decimal::MAX` instead of overflowing.
pub fn sum_amounts<'a, T: 'a>(
    items: impl IntoIterator<Item = &'a T>,
    field: &'static str,
    get: impl Fn(&T) -> Option<Decimal>,
) -> Decimal {
    items
        .into_iter()
        .map(|item| amount(get(item), field))
        .fold(Decimal::ZERO, |total, value| {
            total.checked_add(value).unwrap_or(Decimal::MAX)
        })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        let result = round_half_up(dec!(123.454));

        assert_eq!(result, dec!(123.45));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        let result = round_half_up(dec!(1412.955));

        assert_eq!(result, dec!(1412.96));
    }

    #[test]
    fn round_half_up_handles_negative_values() {
        let result = round_half_up(dec!(-123.455));

        assert_eq!(result, dec!(-123.46));
    }

    #[test]
    fn round_half_up_handles_large_values() {
        let result = round_half_up(dec!(999999.999));

        assert_eq!(result, dec!(1000000.00));
    }

    // =========================================================================
    // max / floor_zero tests
    // =========================================================================

    #[test]
    fn max_returns_larger_value() {
        assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
        assert_eq!(max(dec!(200.00), dec!(100.00)), dec!(200.00));
    }

    #[test]
    fn floor_zero_clamps_negative() {
        assert_eq!(floor_zero(dec!(-0.01)), dec!(0));
        assert_eq!(floor_zero(dec!(3)), dec!(3));
    }

    // =========================================================================
    // amount / sum_amounts tests
    // =========================================================================

    #[test]
    fn amount_treats_blank_as_zero() {
        assert_eq!(amount(None, "test"), Decimal::ZERO);
    }

    #[test]
    fn amount_clamps_negative_to_zero() {
        assert_eq!(amount(Some(dec!(-250)), "test"), Decimal::ZERO);
    }

    #[test]
    fn amount_clamps_huge_values_to_ceiling() {
        assert_eq!(amount(Some(Decimal::MAX), "test"), MAX_ENTERED_AMOUNT);
        assert_eq!(amount(Some(MAX_ENTERED_AMOUNT), "test"), MAX_ENTERED_AMOUNT);
    }

    #[test]
    fn sum_amounts_skips_blanks() {
        let boxes = vec![Some(dec!(10)), None, Some(dec!(2.5)), Some(dec!(-4))];

        let total = sum_amounts(&boxes, "test", |b| *b);

        assert_eq!(total, dec!(12.5));
    }

    #[test]
    fn sum_amounts_of_nothing_is_zero() {
        let boxes: Vec<Option<Decimal>> = Vec::new();

        assert_eq!(sum_amounts(&boxes, "test", |b| *b), Decimal::ZERO);
    }

    #[test]
    fn sum_amounts_of_huge_values_does_not_overflow() {
        let half_max = Decimal::MAX / dec!(2) + Decimal::ONE;
        let boxes = vec![Some(half_max), Some(half_max), Some(Decimal::MAX)];

        let total = sum_amounts(&boxes, "test", |b| *b);

        assert_eq!(total, MAX_ENTERED_AMOUNT * dec!(3));
    }
}
