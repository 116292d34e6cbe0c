//! Progressive (marginal-rate) income tax.
//!
//! Each bracket taxes only the slice of income that falls between its lower
//! bound and its upper limit. Walking the brackets lowest first:
//!
//! | Step | Action |
//! |------|--------|
//! | 1    | Stop once no income remains |
//! | 2    | Portion = remaining income, capped at the bracket width (top bracket: uncapped) |
//! | 3    | Bracket tax = portion × rate, accumulated at full precision |
//! | 4    | Emit a [`BracketLine`] with the rounded portion and tax |
//! | 5    | Subtract the portion and move the lower bound up |
//!
//! The total is rounded once at the end, so it can differ by a cent from the
//! sum of the rounded per-bracket figures.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::IncomeTaxCalculator;
//! use tax_core::{RateTable, RateTableConfig};
//!
//! let table = RateTable::new(RateTableConfig::greece_2024()).unwrap();
//! let calculator = IncomeTaxCalculator::new(&table);
//!
//! // 10 000 × 9% + 5 000 × 22%
//! let result = calculator.calculate(dec!(15000));
//!
//! assert_eq!(result.total_tax, dec!(2000.00));
//! assert_eq!(result.bracket_lines.len(), 2);
//! ```

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{ratio_percent, round_half_up, to_percent};
use crate::models::{BracketLine, IncomeTaxResult, RateTable, TaxBracket};

/// Calculator for progressive income tax over a validated bracket schedule.
#[derive(Debug, Clone)]
pub struct IncomeTaxCalculator<'a> {
    brackets: &'a [TaxBracket],
}

impl<'a> IncomeTaxCalculator<'a> {
    pub fn new(rate_table: &'a RateTable) -> Self {
        Self {
            brackets: rate_table.brackets(),
        }
    }

    /// Computes income tax on `taxable_income`.
    ///
    /// Zero or negative income yields [`IncomeTaxResult::zero`] without
    /// touching the brackets.
    pub fn calculate(
        &self,
        taxable_income: Decimal,
    ) -> IncomeTaxResult {
        if taxable_income <= Decimal::ZERO {
            debug!("taxable income is zero or negative; no income tax");
            return IncomeTaxResult::zero();
        }

        debug!(brackets = self.brackets.len(), "walking income tax brackets");

        let mut total_tax = Decimal::ZERO;
        let mut remaining = taxable_income;
        let mut lower_bound = Decimal::ZERO;
        let mut bracket_lines = Vec::new();

        for (index, bracket) in self.brackets.iter().enumerate() {
            if remaining <= Decimal::ZERO {
                break;
            }

            let portion = self.portion_in_bracket(bracket, lower_bound, remaining);
            let tax = portion * bracket.rate;
            total_tax += tax;

            let line = BracketLine {
                lower_bound: round_half_up(lower_bound),
                upper_bound: bracket.upper_limit.map(round_half_up),
                rate_percent: to_percent(bracket.rate),
                taxable_amount: round_half_up(portion),
                tax_amount: round_half_up(tax),
            };
            debug!(
                bracket = index + 1,
                amount = %line.taxable_amount,
                rate = %line.rate_percent,
                tax = %line.tax_amount,
                "bracket applied"
            );
            bracket_lines.push(line);

            remaining -= portion;
            if let Some(upper_limit) = bracket.upper_limit {
                lower_bound = upper_limit;
            }
        }

        let result = IncomeTaxResult {
            total_tax: round_half_up(total_tax),
            effective_rate_percent: ratio_percent(total_tax, taxable_income),
            bracket_lines,
        };
        debug!(
            total_tax = %result.total_tax,
            effective_rate = %result.effective_rate_percent,
            "income tax calculated"
        );
        result
    }

    /// Income falling inside `bracket`, given what is left to tax.
    fn portion_in_bracket(
        &self,
        bracket: &TaxBracket,
        lower_bound: Decimal,
        remaining: Decimal,
    ) -> Decimal {
        match bracket.upper_limit {
            Some(upper_limit) => remaining.min(upper_limit - lower_bound),
            None => remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::RateTableConfig;

    fn default_table() -> RateTable {
        RateTable::new(RateTableConfig::greece_2024()).unwrap()
    }

    // =========================================================================
    // zero handling
    // =========================================================================

    #[test]
    fn calculate_returns_zero_for_zero_income() {
        let table = default_table();
        let calculator = IncomeTaxCalculator::new(&table);

        let result = calculator.calculate(dec!(0));

        assert_eq!(result, IncomeTaxResult::zero());
    }

    #[test]
    fn calculate_returns_zero_for_negative_income() {
        let table = default_table();
        let calculator = IncomeTaxCalculator::new(&table);

        let result = calculator.calculate(dec!(-5000));

        assert_eq!(result.total_tax, dec!(0.00));
        assert_eq!(result.effective_rate_percent, dec!(0.00));
        assert!(result.bracket_lines.is_empty());
    }

    // =========================================================================
    // bracket boundaries
    // =========================================================================

    #[test]
    fn calculate_first_bracket_only() {
        let table = default_table();
        let calculator = IncomeTaxCalculator::new(&table);

        let result = calculator.calculate(dec!(5000));

        assert_eq!(result.total_tax, dec!(450.00));
        assert_eq!(result.effective_rate_percent, dec!(9.00));
        assert_eq!(
            result.bracket_lines,
            vec![BracketLine {
                lower_bound: dec!(0.00),
                upper_bound: Some(dec!(10000.00)),
                rate_percent: dec!(9.00),
                taxable_amount: dec!(5000.00),
                tax_amount: dec!(450.00),
            }]
        );
    }

    #[test]
    fn calculate_exactly_at_first_boundary_uses_one_bracket() {
        let table = default_table();
        let calculator = IncomeTaxCalculator::new(&table);

        let result = calculator.calculate(dec!(10000));

        assert_eq!(result.total_tax, dec!(900.00));
        assert_eq!(result.bracket_lines.len(), 1);
    }

    #[test]
    fn calculate_one_euro_over_first_boundary() {
        let table = default_table();
        let calculator = IncomeTaxCalculator::new(&table);

        let result = calculator.calculate(dec!(10001));

        // 900 + 1 × 22%
        assert_eq!(result.total_tax, dec!(900.22));
        assert_eq!(result.bracket_lines.len(), 2);
        assert_eq!(result.bracket_lines[1].taxable_amount, dec!(1.00));
        assert_eq!(result.bracket_lines[1].lower_bound, dec!(10000.00));
    }

    #[test]
    fn calculate_at_20000() {
        let table = default_table();
        let calculator = IncomeTaxCalculator::new(&table);

        let result = calculator.calculate(dec!(20000));

        assert_eq!(result.total_tax, dec!(3100.00));
        assert_eq!(result.effective_rate_percent, dec!(15.50));
    }

    #[test]
    fn calculate_at_30000() {
        let table = default_table();
        let calculator = IncomeTaxCalculator::new(&table);

        let result = calculator.calculate(dec!(30000));

        assert_eq!(result.total_tax, dec!(5900.00));
        assert_eq!(result.effective_rate_percent, dec!(19.67));
    }

    #[test]
    fn calculate_at_40000() {
        let table = default_table();
        let calculator = IncomeTaxCalculator::new(&table);

        let result = calculator.calculate(dec!(40000));

        assert_eq!(result.total_tax, dec!(9500.00));
        assert_eq!(result.effective_rate_percent, dec!(23.75));
        assert_eq!(result.bracket_lines.len(), 4);
    }

    #[test]
    fn calculate_touches_top_bracket() {
        let table = default_table();
        let calculator = IncomeTaxCalculator::new(&table);

        let result = calculator.calculate(dec!(50000));

        assert_eq!(result.total_tax, dec!(13900.00));
        assert_eq!(result.effective_rate_percent, dec!(27.80));
        let top = &result.bracket_lines[4];
        assert_eq!(top.lower_bound, dec!(40000.00));
        assert_eq!(top.upper_bound, None);
        assert_eq!(top.rate_percent, dec!(44.00));
        assert_eq!(top.taxable_amount, dec!(10000.00));
        assert_eq!(top.tax_amount, dec!(4400.00));
    }

    #[test]
    fn calculate_puts_everything_above_40000_in_top_bracket() {
        let table = default_table();
        let calculator = IncomeTaxCalculator::new(&table);

        let result = calculator.calculate(dec!(100000));

        assert_eq!(result.total_tax, dec!(35900.00));
        assert_eq!(result.bracket_lines[4].taxable_amount, dec!(60000.00));
    }

    #[test]
    fn calculate_reports_bracket_bounds_in_order() {
        let table = default_table();
        let calculator = IncomeTaxCalculator::new(&table);

        let result = calculator.calculate(dec!(25000));

        let bounds: Vec<(Decimal, Option<Decimal>)> = result
            .bracket_lines
            .iter()
            .map(|l| (l.lower_bound, l.upper_bound))
            .collect();
        assert_eq!(
            bounds,
            vec![
                (dec!(0), Some(dec!(10000))),
                (dec!(10000), Some(dec!(20000))),
                (dec!(20000), Some(dec!(30000))),
            ]
        );
        assert_eq!(result.total_tax, dec!(4500.00));
    }

    // =========================================================================
    // precision
    // =========================================================================

    #[test]
    fn calculate_rounds_total_once_from_full_precision() {
        let table = default_table();
        let calculator = IncomeTaxCalculator::new(&table);

        // 10000 × 0.09 + 0.05 × 0.22 = 900.011
        let result = calculator.calculate(dec!(10000.05));

        assert_eq!(result.total_tax, dec!(900.01));
        assert_eq!(result.bracket_lines[1].tax_amount, dec!(0.01));
    }

    #[test]
    fn calculate_with_cents_stays_exact() {
        let table = default_table();
        let calculator = IncomeTaxCalculator::new(&table);

        // 3000 × 0.09 = 270
        let result = calculator.calculate(dec!(3000.00));

        assert_eq!(result.total_tax, dec!(270.00));
    }
}
