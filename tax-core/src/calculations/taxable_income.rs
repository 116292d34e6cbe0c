use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{max, round_half_up};

/// Gross income minus deductible expenses, never below zero.
///
/// Callers are expected to reject expenses above income before getting
/// here; this still floors the result at zero if they do not.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::taxable_income;
///
/// assert_eq!(taxable_income(dec!(35000), dec!(5000)), dec!(30000.00));
/// assert_eq!(taxable_income(dec!(1000), dec!(5000)), dec!(0.00));
/// ```
pub fn taxable_income(
    gross_income: Decimal,
    deductible_expenses: Decimal,
) -> Decimal {
    let taxable = round_half_up(max(gross_income - deductible_expenses, Decimal::ZERO));
    debug!(taxable_income = %taxable, "taxable income derived");
    taxable
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn taxable_income_without_expenses_is_gross() {
        assert_eq!(taxable_income(dec!(50000), dec!(0)), dec!(50000.00));
    }

    #[test]
    fn taxable_income_is_zero_when_expenses_equal_income() {
        assert_eq!(taxable_income(dec!(25000), dec!(25000)), dec!(0.00));
    }

    #[test]
    fn taxable_income_is_floored_when_expenses_exceed_income() {
        assert_eq!(taxable_income(dec!(20000), dec!(30000)), dec!(0.00));
    }

    #[test]
    fn taxable_income_rounds_half_up() {
        assert_eq!(taxable_income(dec!(15000.555), dec!(5000)), dec!(10000.56));
    }

    #[test]
    fn taxable_income_keeps_cents() {
        assert_eq!(taxable_income(dec!(40000.50), dec!(10000.25)), dec!(30000.25));
    }
}
