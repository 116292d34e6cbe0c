use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{round_half_up, to_percent};
use crate::models::{RateTable, VatResult};

/// Flat-rate VAT on gross income.
///
/// VAT is always levied on gross income; deductible expenses never reduce it.
#[derive(Debug, Clone, Copy)]
pub struct VatCalculator {
    vat_rate: Decimal,
}

impl VatCalculator {
    pub fn new(rate_table: &RateTable) -> Self {
        Self {
            vat_rate: rate_table.vat_rate(),
        }
    }

    pub fn calculate(
        &self,
        gross_income: Decimal,
    ) -> VatResult {
        let rate_percent = to_percent(self.vat_rate);

        if gross_income <= Decimal::ZERO {
            return VatResult {
                vat_amount: Decimal::new(0, 2),
                rate_percent,
            };
        }

        let vat_amount = round_half_up(gross_income * self.vat_rate);
        debug!(vat = %vat_amount, rate = %rate_percent, "VAT calculated");

        VatResult {
            vat_amount,
            rate_percent,
        }
    }
}
