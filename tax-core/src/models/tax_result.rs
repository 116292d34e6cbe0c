use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::round_half_up;

/// The slice of taxable income that fell into one bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketLine {
    /// Lower bound of the bracket (upper limit of the previous one).
    pub lower_bound: Decimal,

    /// Upper bound of the bracket; `None` for the open-ended top bracket.
    pub upper_bound: Option<Decimal>,

    /// Marginal rate as a percentage, e.g. `22.00`.
    pub rate_percent: Decimal,

    /// Income taxed inside this bracket.
    pub taxable_amount: Decimal,

    /// Tax owed on `taxable_amount`, rounded on its own.
    pub tax_amount: Decimal,
}

/// Progressive income tax for one taxable income figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeTaxResult {
    /// Total income tax, rounded once from the full-precision sum.
    pub total_tax: Decimal,

    /// `total_tax / taxable_income × 100`; zero when there is no taxable income.
    pub effective_rate_percent: Decimal,

    /// One line per bracket touched, lowest first.
    pub bracket_lines: Vec<BracketLine>,
}

impl IncomeTaxResult {
    /// The result for zero or negative taxable income.
    pub fn zero() -> Self {
        Self {
            total_tax: Decimal::new(0, 2),
            effective_rate_percent: Decimal::new(0, 2),
            bracket_lines: Vec::new(),
        }
    }
}

/// VAT owed on gross income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatResult {
    pub vat_amount: Decimal,
    pub rate_percent: Decimal,
}

impl VatResult {
    /// Gross income plus VAT: the amount invoiced to clients.
    ///
    /// Zero when `gross_income` is zero or negative, matching the zero VAT
    /// reported for such incomes.
    pub fn total_with_vat(
        &self,
        gross_income: Decimal,
    ) -> Decimal {
        if gross_income <= Decimal::ZERO {
            return Decimal::new(0, 2);
        }
        round_half_up(gross_income + self.vat_amount)
    }
}

/// Social-security contribution on gross income.
///
/// `main_insurance + additional_contribution` may differ from
/// `total_contribution` by one cent: each figure is rounded independently
/// from its own full-precision product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialSecurityResult {
    pub total_contribution: Decimal,
    pub main_insurance: Decimal,
    pub additional_contribution: Decimal,
    pub rate_percent: Decimal,
}

/// The complete outcome of one calculation request.
///
/// Invariants, all on the rounded figures:
///
/// - `total_taxes == income_tax.total_tax + social_security.total_contribution`
/// - `total_obligations == total_taxes + vat.vat_amount`
/// - `net_income == gross_income - total_taxes`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResult {
    pub gross_income: Decimal,
    pub deductible_expenses: Decimal,
    pub taxable_income: Decimal,
    pub income_tax: IncomeTaxResult,
    pub vat: VatResult,
    pub social_security: SocialSecurityResult,

    /// Income tax plus social security. VAT is collected on behalf of the
    /// state and is not part of this figure.
    pub total_taxes: Decimal,

    /// Everything owed, VAT included.
    pub total_obligations: Decimal,

    pub net_income: Decimal,

    /// `total_taxes / gross_income × 100`.
    pub effective_total_rate_percent: Decimal,
}
