use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{round_half_up, to_percent};
use crate::models::{RateTable, SocialSecurityResult};

/// Social-security contribution on gross income, split into main insurance
/// and an additional contribution.
///
/// The total comes from the combined rate rather than from the two rounded
/// parts, so the parts can be one cent off the total.
#[derive(Debug, Clone, Copy)]
pub struct SocialSecurityCalculator {
    main_rate: Decimal,
    additional_rate: Decimal,
    total_rate: Decimal,
}

impl SocialSecurityCalculator {
    pub fn new(rate_table: &RateTable) -> Self {
        Self {
            main_rate: rate_table.social_main_rate(),
            additional_rate: rate_table.social_additional_rate(),
            total_rate: rate_table.social_total_rate(),
        }
    }

    pub fn calculate(
        &self,
        gross_income: Decimal,
    ) -> SocialSecurityResult {
        let rate_percent = to_percent(self.total_rate);

        if gross_income <= Decimal::ZERO {
            return SocialSecurityResult {
                total_contribution: Decimal::new(0, 2),
                main_insurance: Decimal::new(0, 2),
                additional_contribution: Decimal::new(0, 2),
                rate_percent,
            };
        }

        let result = SocialSecurityResult {
            total_contribution: round_half_up(gross_income * self.total_rate),
            main_insurance: round_half_up(gross_income * self.main_rate),
            additional_contribution: round_half_up(gross_income * self.additional_rate),
            rate_percent,
        };
        debug!(
            total = %result.total_contribution,
            main = %result.main_insurance,
            additional = %result.additional_contribution,
            "social security calculated"
        );
        result
    }
}
