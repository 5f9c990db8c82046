//! Decimal helpers implementing the regulator's rounding rules.
//!
//! The PAYE and National Insurance specifications prescribe a handful of
//! truncation and rounding rules that differ from ordinary rounding. Every
//! function here operates on [`Decimal`] values; binary floating point is only
//! ever used by [`multiply`] in its deliberately lossy mode.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Largest scale a [`Decimal`] can carry.
const MAX_SCALE: u32 = 28;

/// Significant digits kept by the reduced precision multiplication mode.
const LOW_ACCURACY_DIGITS: u32 = 7;

/// Precision used by [`multiply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiplicationAccuracy {
    /// Exact decimal multiplication.
    #[default]
    High,
    /// Multiplication through single precision floats, keeping seven
    /// significant digits. Matches tables produced on reduced precision
    /// hardware.
    Low,
}

/// Returns `10^exponent` as an exact decimal.
///
/// Exponents above the maximum decimal scale are clamped.
pub fn power_of_ten(exponent: u32) -> Decimal {
    let exponent = exponent.min(MAX_SCALE);
    Decimal::from_i128_with_scale(10_i128.pow(exponent), 0)
}

/// One unit in the last place at `places` decimal places (e.g. 0.01 for 2).
fn unit_at_scale(places: u32) -> Decimal {
    Decimal::new(1, places.min(MAX_SCALE))
}

/// Drops every digit beyond `places` decimal places, moving toward zero.
///
/// A negative `places` truncates to the left of the decimal point, so `-1`
/// truncates to tens and `-2` to hundreds.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::tax_math::truncate;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let value = Decimal::from_str("9999.999999999").unwrap();
/// assert_eq!(truncate(value, 2), Decimal::from_str("9999.99").unwrap());
/// assert_eq!(truncate(value, -1), Decimal::from(9990));
/// assert_eq!(truncate(-value, 0), Decimal::from(-9999));
/// ```
pub fn truncate(value: Decimal, places: i32) -> Decimal {
    if places >= 0 {
        let places = places.unsigned_abs();
        if places >= MAX_SCALE {
            return value;
        }
        return value.round_dp_with_strategy(places, RoundingStrategy::ToZero);
    }

    // Integral values divide exactly by a power of ten, so no digit below the
    // truncation point can be rounded up into it.
    let multiplier = power_of_ten(places.unsigned_abs());
    let whole = value.trunc();
    (whole / multiplier).trunc() * multiplier
}

/// Truncates to `places + 1` decimal places then rounds half to even.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::tax_math::bankers_round;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let dec = |s: &str| Decimal::from_str(s).unwrap();
/// assert_eq!(bankers_round(dec("1.956"), 2), dec("1.96"));
/// assert_eq!(bankers_round(dec("2.4719"), 2), dec("2.47"));
/// ```
pub fn bankers_round(value: Decimal, places: u32) -> Decimal {
    if places >= MAX_SCALE {
        return value;
    }
    let truncated = truncate(value, places as i32 + 1);
    truncated.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Rounds using the regulator's "half rounds down" rule.
///
/// The value is truncated to `places + 1` decimal places. The remainder below
/// the target scale rounds down when it is 0.5 or less and up otherwise.
pub fn hmrc_round(value: Decimal, places: u32) -> Decimal {
    if places >= MAX_SCALE {
        return value;
    }
    let truncated = truncate(value, places as i32 + 1);
    let factor = power_of_ten(places);

    // A product out of range means the value already carries fewer than
    // `places` decimal places, so there is nothing to round.
    let Some(scaled) = truncated.checked_mul(factor) else {
        return truncated;
    };
    let unround = scaled.floor();
    let fraction = scaled - unround;

    if fraction <= Decimal::new(5, 1) {
        unround / factor
    } else {
        (unround + Decimal::ONE) / factor
    }
}

/// Rounds up to `places` decimal places.
///
/// The value is truncated and one unit at the target scale is added whenever
/// digits were discarded. Values already exact at that scale are returned
/// unchanged, so `988.25` stays `988.25`.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::tax_math::up_round;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let dec = |s: &str| Decimal::from_str(s).unwrap();
/// assert_eq!(up_round(dec("2.4719"), 2), dec("2.48"));
/// assert_eq!(up_round(dec("988.25"), 2), dec("988.25"));
/// ```
pub fn up_round(value: Decimal, places: u32) -> Decimal {
    if places >= MAX_SCALE {
        return value;
    }
    let truncated = truncate(value, places as i32);
    if truncated < value {
        truncated + unit_at_scale(places)
    } else {
        truncated
    }
}

/// Rounds a pro-rated figure to whole pounds.
///
/// When the figure was spread over more than one period it is rounded up;
/// a single-period figure rounds half away from zero.
pub fn period_round(value: Decimal, periods: u32) -> Decimal {
    if periods > 1 {
        value.ceil()
    } else {
        value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// Multiplies two values at the requested accuracy.
///
/// # Errors
///
/// Returns [`EngineError::CalculationError`] when the low accuracy product
/// cannot be represented as a single precision float.
pub fn multiply(x: Decimal, y: Decimal, accuracy: MultiplicationAccuracy) -> EngineResult<Decimal> {
    match accuracy {
        MultiplicationAccuracy::High => x.checked_mul(y).ok_or_else(|| overflow(x, y)),
        MultiplicationAccuracy::Low => {
            let product = x.to_f32().zip(y.to_f32()).map(|(a, b)| a * b);
            product
                .filter(|p| p.is_finite())
                .and_then(Decimal::from_f32)
                .and_then(|p| p.round_sf(LOW_ACCURACY_DIGITS))
                .ok_or_else(|| overflow(x, y))
        }
    }
}

fn overflow(x: Decimal, y: Decimal) -> EngineError {
    EngineError::CalculationError {
        message: format!("product of {} and {} is out of range", x, y),
    }
}

/// Scales `start` by `factor_of / factor_by`, dividing first.
///
/// `factor_by` must not be zero.
pub fn factor(start: Decimal, factor_of: Decimal, factor_by: Decimal) -> Decimal {
    (start / factor_by) * factor_of
}

/// Clamps negative values to zero.
pub fn positive_only(value: Decimal) -> Decimal {
    if value > Decimal::ZERO {
        value
    } else {
        Decimal::ZERO
    }
}

/// Returns the smaller of two values.
pub fn smallest(x: Decimal, y: Decimal) -> Decimal {
    if x >= y { y } else { x }
}
