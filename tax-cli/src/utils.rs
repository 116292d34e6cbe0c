use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseDecimalError {
    #[error("please enter a value")]
    Empty,

    #[error("'{input}' is not a valid number: {reason}")]
    Invalid { input: String, reason: String },
}

/// Normalizes input for decimal parsing: trims whitespace, drops a leading
/// euro sign and removes commas (thousands separator).
fn normalize_decimal_input(s: &str) -> String {
    let trimmed = s.trim();
    let trimmed = trimmed.strip_prefix('€').unwrap_or(trimmed);
    trimmed.trim().replace(',', "")
}

/// Parses a string into a [`Decimal`].
///
/// Handles comma as thousands separator (e.g. `"1,234.56"`) and a leading
/// `€`. Empty or whitespace-only input is rejected.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Err(ParseDecimalError::Empty);
    }
    normalized.parse().map_err(|e: rust_decimal::Error| {
        tracing::debug!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError::Invalid {
            input: s.trim().to_string(),
            reason: e.to_string(),
        }
    })
}

/// Formats an amount as `€50,000.00`; negatives as `-€50.00`.
pub fn format_currency(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let text = rounded.abs().to_string();
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}€{grouped}.{cents}")
}

/// Formats a percentage figure with two decimals, e.g. `22.00%`.
pub fn format_percent(percent: Decimal) -> String {
    format!("{:.2}%", percent)
}
