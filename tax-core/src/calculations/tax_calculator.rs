//! Combines taxable income, income tax, VAT and social security into one
//! [`TaxResult`].
//!
//! Income tax is levied on taxable income (gross minus expenses). VAT and
//! social security are levied on gross income, so expenses lower the income
//! tax bill but leave the other two untouched.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::{RateTable, RateTableConfig, TaxCalculator};
//!
//! let table = RateTable::new(RateTableConfig::greece_2024()).unwrap();
//! let result = TaxCalculator::new(&table).compute_taxes(dec!(15000), dec!(0));
//!
//! assert_eq!(result.income_tax.total_tax, dec!(2000.00));
//! assert_eq!(result.social_security.total_contribution, dec!(3000.00));
//! assert_eq!(result.net_income, dec!(10000.00));
//! ```

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::calculations::common::{ratio_percent, round_half_up};
use crate::calculations::{
    IncomeTaxCalculator, SocialSecurityCalculator, VatCalculator, taxable_income,
};
use crate::models::{RateTable, TaxResult};

/// Runs every calculator against one rate table.
#[derive(Debug, Clone)]
pub struct TaxCalculator<'a> {
    income_tax: IncomeTaxCalculator<'a>,
    vat: VatCalculator,
    social_security: SocialSecurityCalculator,
}

impl<'a> TaxCalculator<'a> {
    pub fn new(rate_table: &'a RateTable) -> Self {
        Self {
            income_tax: IncomeTaxCalculator::new(rate_table),
            vat: VatCalculator::new(rate_table),
            social_security: SocialSecurityCalculator::new(rate_table),
        }
    }

    /// Computes every tax obligation for one gross income and expense pair.
    ///
    /// Inputs are expected to be validated by the caller (non-negative,
    /// expenses not above income). Out-of-range values degrade to zero
    /// figures rather than failing.
    pub fn compute_taxes(
        &self,
        gross_income: Decimal,
        deductible_expenses: Decimal,
    ) -> TaxResult {
        if gross_income <= Decimal::ZERO {
            debug!("gross income is zero or negative; returning zero result");
            return self.zero_result(gross_income, deductible_expenses);
        }

        let taxable = taxable_income(gross_income, deductible_expenses);
        let income_tax = self.income_tax.calculate(taxable);
        let vat = self.vat.calculate(gross_income);
        let social_security = self.social_security.calculate(gross_income);

        let total_taxes = income_tax.total_tax + social_security.total_contribution;
        let total_obligations = total_taxes + vat.vat_amount;

        let result = TaxResult {
            gross_income: round_half_up(gross_income),
            deductible_expenses: round_half_up(deductible_expenses),
            taxable_income: taxable,
            income_tax,
            vat,
            social_security,
            total_taxes: round_half_up(total_taxes),
            total_obligations: round_half_up(total_obligations),
            net_income: round_half_up(gross_income - total_taxes),
            effective_total_rate_percent: ratio_percent(total_taxes, gross_income),
        };

        info!("Tax calculation completed");
        debug!(
            gross = %result.gross_income,
            taxable = %result.taxable_income,
            total_taxes = %result.total_taxes,
            net = %result.net_income,
            "tax result"
        );
        result
    }

    fn zero_result(
        &self,
        gross_income: Decimal,
        deductible_expenses: Decimal,
    ) -> TaxResult {
        let zero = Decimal::new(0, 2);
        TaxResult {
            gross_income: round_half_up(gross_income),
            deductible_expenses: round_half_up(deductible_expenses),
            taxable_income: zero,
            income_tax: self.income_tax.calculate(Decimal::ZERO),
            vat: self.vat.calculate(Decimal::ZERO),
            social_security: self.social_security.calculate(Decimal::ZERO),
            total_taxes: zero,
            total_obligations: zero,
            net_income: zero,
            effective_total_rate_percent: zero,
        }
    }
}

/// Free-function form of [`TaxCalculator::compute_taxes`].
pub fn compute_taxes(
    rate_table: &RateTable,
    gross_income: Decimal,
    deductible_expenses: Decimal,
) -> TaxResult {
    TaxCalculator::new(rate_table).compute_taxes(gross_income, deductible_expenses)
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
    // normal path
    // =========================================================================

    #[test]
    fn compute_taxes_without_expenses() {
        let table = default_table();

        let result = compute_taxes(&table, dec!(15000), dec!(0));

        assert_eq!(result.taxable_income, dec!(15000.00));
        assert_eq!(result.income_tax.total_tax, dec!(2000.00));
        assert_eq!(result.vat.vat_amount, dec!(3600.00));
        assert_eq!(result.social_security.total_contribution, dec!(3000.00));
        assert_eq!(result.total_taxes, dec!(5000.00));
        assert_eq!(result.total_obligations, dec!(8600.00));
        assert_eq!(result.net_income, dec!(10000.00));
        assert_eq!(result.effective_total_rate_percent, dec!(33.33));
    }

    #[test]
    fn compute_taxes_social_security_on_gross_not_taxable() {
        let table = default_table();

        let result = compute_taxes(&table, dec!(35000), dec!(5000));

        assert_eq!(result.taxable_income, dec!(30000.00));
        assert_eq!(result.income_tax.total_tax, dec!(5900.00));
        assert_eq!(result.social_security.total_contribution, dec!(7000.00));
        assert_eq!(result.vat.vat_amount, dec!(8400.00));
        assert_eq!(result.total_taxes, dec!(12900.00));
        assert_eq!(result.net_income, dec!(22100.00));
    }

    #[test]
    fn compute_taxes_expenses_equal_income() {
        let table = default_table();

        let result = compute_taxes(&table, dec!(25000), dec!(25000));

        assert_eq!(result.taxable_income, dec!(0.00));
        assert_eq!(result.income_tax.total_tax, dec!(0.00));
        assert!(result.income_tax.bracket_lines.is_empty());
        assert_eq!(result.social_security.total_contribution, dec!(5000.00));
        assert_eq!(result.vat.vat_amount, dec!(6000.00));
        assert_eq!(result.net_income, dec!(20000.00));
        assert_eq!(result.effective_total_rate_percent, dec!(20.00));
    }

    #[test]
    fn compute_taxes_totals_match_components() {
        let table = default_table();

        let result = compute_taxes(&table, dec!(48123.45), dec!(3210.98));

        assert_eq!(
            result.total_taxes,
            result.income_tax.total_tax + result.social_security.total_contribution
        );
        assert_eq!(result.total_obligations, result.total_taxes + result.vat.vat_amount);
        assert_eq!(result.net_income, result.gross_income - result.total_taxes);
    }

    #[test]
    fn compute_taxes_through_calculator_struct_matches_free_function() {
        let table = default_table();
        let calculator = TaxCalculator::new(&table);

        assert_eq!(
            calculator.compute_taxes(dec!(60000), dec!(10000)),
            compute_taxes(&table, dec!(60000), dec!(10000))
        );
    }

    // =========================================================================
    // zero path
    // =========================================================================

    #[test]
    fn compute_taxes_zero_income_is_all_zero() {
        let table = default_table();

        let result = compute_taxes(&table, dec!(0), dec!(0));

        assert_eq!(result.gross_income, dec!(0.00));
        assert_eq!(result.taxable_income, dec!(0.00));
        assert_eq!(result.income_tax.total_tax, dec!(0.00));
        assert_eq!(result.vat.vat_amount, dec!(0.00));
        assert_eq!(result.social_security.total_contribution, dec!(0.00));
        assert_eq!(result.total_taxes, dec!(0.00));
        assert_eq!(result.total_obligations, dec!(0.00));
        assert_eq!(result.net_income, dec!(0.00));
        assert_eq!(result.effective_total_rate_percent, dec!(0.00));
    }

    #[test]
    fn compute_taxes_zero_income_keeps_configured_rates() {
        let table = default_table();

        let result = compute_taxes(&table, dec!(0), dec!(0));

        assert_eq!(result.vat.rate_percent, dec!(24.00));
        assert_eq!(result.social_security.rate_percent, dec!(20.00));
    }

    #[test]
    fn compute_taxes_zero_income_echoes_expenses() {
        let table = default_table();

        let result = compute_taxes(&table, dec!(0), dec!(150.5));

        assert_eq!(result.deductible_expenses, dec!(150.50));
        assert_eq!(result.net_income, dec!(0.00));
    }

    #[test]
    fn compute_taxes_negative_income_takes_zero_path() {
        let table = default_table();

        let result = compute_taxes(&table, dec!(-1000), dec!(0));

        assert_eq!(result.taxable_income, dec!(0.00));
        assert_eq!(result.total_taxes, dec!(0.00));
    }
}
