//! Range checks on user-supplied amounts and frequencies.
//!
//! The engine itself never rejects an amount; these checks keep obviously
//! wrong input from reaching it.

use rust_decimal::Decimal;
use tax_core::{PaymentFrequency, ScheduleError};
use thiserror::Error;
use tracing::warn;

use crate::utils::{ParseDecimalError, format_currency, parse_decimal};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("{field}: {source}")]
    NotANumber {
        field: &'static str,
        #[source]
        source: ParseDecimalError,
    },

    #[error("{field} cannot be negative (you entered {})", money(.value))]
    Negative { field: &'static str, value: Decimal },

    #[error(
        "{field} of {} seems unrealistic, please enter a value up to {}",
        money(.value),
        money(.max)
    )]
    AboveMaximum {
        field: &'static str,
        value: Decimal,
        max: Decimal,
    },

    #[error(
        "deductible expenses ({}) cannot exceed gross income ({})",
        money(.expenses),
        money(.income)
    )]
    ExpensesExceedIncome { expenses: Decimal, income: Decimal },

    #[error(transparent)]
    Frequency(#[from] ScheduleError),
}

fn money(amount: &Decimal) -> String {
    format_currency(*amount)
}

/// Parses `input` as a non-negative amount no larger than `max`.
pub fn validate_amount(
    field: &'static str,
    input: &str,
    max: Decimal,
) -> Result<Decimal, InputError> {
    let value = parse_decimal(input).map_err(|source| InputError::NotANumber { field, source })?;

    if value < Decimal::ZERO {
        warn!(field, "validation failed: negative amount");
        return Err(InputError::Negative { field, value });
    }
    if value > max {
        warn!(field, "validation failed: amount above maximum");
        return Err(InputError::AboveMaximum { field, value, max });
    }

    Ok(value)
}

/// Rejects expenses larger than the gross income they are deducted from.
pub fn validate_expenses(
    expenses: Decimal,
    income: Decimal,
) -> Result<(), InputError> {
    if expenses > income {
        warn!("validation failed: expenses exceed gross income");
        return Err(InputError::ExpensesExceedIncome { expenses, income });
    }
    Ok(())
}

pub fn validate_frequency(input: &str) -> Result<PaymentFrequency, InputError> {
    Ok(input.parse::<PaymentFrequency>()?)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const MAX: Decimal = Decimal::from_parts(10_000_000, 0, 0, false, 0);

    // =========================================================================
    // validate_amount tests
    // =========================================================================

    #[test]
    fn validate_amount_accepts_zero_and_formatted_input() {
        assert_eq!(validate_amount("Gross income", "0", MAX), Ok(dec!(0)));
        assert_eq!(validate_amount("Gross income", "€50,000.50", MAX), Ok(dec!(50000.50)));
    }

    #[test]
    fn validate_amount_accepts_maximum() {
        assert_eq!(validate_amount("Gross income", "10000000", MAX), Ok(MAX));
    }

    #[test]
    fn validate_amount_rejects_negative() {
        let err = validate_amount("Expenses", "-1", MAX).unwrap_err();

        assert_eq!(
            err,
            InputError::Negative {
                field: "Expenses",
                value: dec!(-1),
            }
        );
        assert_eq!(err.to_string(), "Expenses cannot be negative (you entered -€1.00)");
    }

    #[test]
    fn validate_amount_rejects_above_maximum() {
        let err = validate_amount("Gross income", "10000000.01", MAX).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Gross income of €10,000,000.01 seems unrealistic, please enter a value up to €10,000,000.00"
        );
    }

    #[test]
    fn validate_amount_rejects_text() {
        let err = validate_amount("Gross income", "lots", MAX).unwrap_err();

        assert!(matches!(err, InputError::NotANumber { field: "Gross income", .. }));
        assert!(err.to_string().starts_with("Gross income: 'lots' is not a valid number"));
    }

    #[test]
    fn validate_amount_rejects_empty() {
        let err = validate_amount("Expenses", "  ", MAX).unwrap_err();

        assert_eq!(
            err,
            InputError::NotANumber {
                field: "Expenses",
                source: ParseDecimalError::Empty,
            }
        );
    }

    // =========================================================================
    // validate_expenses tests
    // =========================================================================

    #[test]
    fn validate_expenses_allows_equal_to_income() {
        assert_eq!(validate_expenses(dec!(25000), dec!(25000)), Ok(()));
    }

    #[test]
    fn validate_expenses_rejects_more_than_income() {
        let err = validate_expenses(dec!(30000), dec!(20000)).unwrap_err();

        assert_eq!(
            err.to_string(),
            "deductible expenses (€30,000.00) cannot exceed gross income (€20,000.00)"
        );
    }

    // =========================================================================
    // validate_frequency tests
    // =========================================================================

    #[test]
    fn validate_frequency_parses_any_case() {
        assert_eq!(validate_frequency("Monthly"), Ok(PaymentFrequency::Monthly));
    }

    #[test]
    fn validate_frequency_names_allowed_values() {
        let err = validate_frequency("weekly").unwrap_err();

        assert_eq!(
            err.to_string(),
            "invalid frequency 'weekly', must be one of: monthly, quarterly, annual"
        );
    }
}
