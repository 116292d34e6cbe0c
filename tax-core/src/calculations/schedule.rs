//! Divides an annual total into equal periodic installments.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::calculations::common::round_half_up;
use crate::models::{PaymentFrequency, PaymentInstallment, PaymentSchedule, ScheduleError};

/// Builds a payment schedule from a frequency name.
///
/// `frequency` is matched case-insensitively against `monthly`, `quarterly`
/// and `annual`.
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidFrequency`] for any other name.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::compute_schedule;
///
/// let schedule = compute_schedule(dec!(5000), "Monthly").unwrap();
/// assert_eq!(schedule.installment_count, 12);
/// assert_eq!(schedule.installment_amount, dec!(416.67));
///
/// assert!(compute_schedule(dec!(5000), "weekly").is_err());
/// ```
pub fn compute_schedule(
    annual_total: Decimal,
    frequency: &str,
) -> Result<PaymentSchedule, ScheduleError> {
    let frequency = frequency.parse::<PaymentFrequency>()?;
    Ok(build_schedule(annual_total, frequency))
}

/// Builds a payment schedule for an already-parsed frequency.
///
/// A negative total is clamped to zero. Every installment receives the same
/// rounded amount; leftover cents are not redistributed.
pub fn build_schedule(
    annual_total: Decimal,
    frequency: PaymentFrequency,
) -> PaymentSchedule {
    let annual_total = if annual_total < Decimal::ZERO {
        warn!(annual_total = %annual_total, "negative annual total clamped to zero");
        Decimal::ZERO
    } else {
        annual_total
    };

    let installment_count = frequency.installment_count();
    let installment_amount = round_half_up(annual_total / Decimal::from(installment_count));

    let installments = (1..=installment_count)
        .map(|period_number| PaymentInstallment {
            period_number,
            amount: installment_amount,
        })
        .collect();

    debug!(
        frequency = %frequency,
        installments = installment_count,
        amount = %installment_amount,
        "payment schedule built"
    );

    PaymentSchedule {
        annual_total: round_half_up(annual_total),
        frequency,
        installment_count,
        installment_amount,
        installments,
    }
}
