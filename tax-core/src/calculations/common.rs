//! Rounding and percentage helpers shared by every calculator.
//!
//! All money and percentage figures leave the calculators through
//! [`round_half_up`]; intermediate products stay at full precision.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to exactly two decimal places, halves away from zero.
///
/// The result always carries a scale of two, so `15000` comes back as
/// `15000.00` and prints that way.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(416.666)), dec!(416.67));
/// assert_eq!(round_half_up(dec!(2962.96272)), dec!(2962.96));
/// assert_eq!(round_half_up(dec!(0.005)), dec!(0.01));
/// assert_eq!(round_half_up(dec!(15000)).to_string(), "15000.00");
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Returns the larger of two values.
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Converts a fractional rate into a rounded percentage (`0.1333` → `13.33`).
pub fn to_percent(rate: Decimal) -> Decimal {
    round_half_up(rate * Decimal::ONE_HUNDRED)
}

/// `part / base × 100`, rounded; zero when `base` is zero or negative.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::ratio_percent;
///
/// assert_eq!(ratio_percent(dec!(5900), dec!(30000)), dec!(19.67));
/// assert_eq!(ratio_percent(dec!(100), dec!(0)), dec!(0.00));
/// ```
pub fn ratio_percent(
    part: Decimal,
    base: Decimal,
) -> Decimal {
    if base <= Decimal::ZERO {
        return round_half_up(Decimal::ZERO);
    }
    round_half_up(part / base * Decimal::ONE_HUNDRED)
}
