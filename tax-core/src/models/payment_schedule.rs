use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building a payment schedule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// The requested frequency is not one of the supported values.
    #[error("invalid frequency '{given}', must be one of: monthly, quarterly, annual")]
    InvalidFrequency { given: String },
}

/// How often the annual tax total is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentFrequency {
    Monthly,
    Quarterly,
    Annual,
}

impl PaymentFrequency {
    /// Every supported frequency, most frequent first.
    pub const ALL: [PaymentFrequency; 3] = [Self::Monthly, Self::Quarterly, Self::Annual];

    /// Number of installments per year.
    pub fn installment_count(self) -> u32 {
        match self {
            Self::Monthly => 12,
            Self::Quarterly => 4,
            Self::Annual => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annual => "annual",
        }
    }

    /// Capitalised name for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::Annual => "Annual",
        }
    }
}

impl FromStr for PaymentFrequency {
    type Err = ScheduleError;

    /// Parses a frequency name, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "annual" => Ok(Self::Annual),
            _ => Err(ScheduleError::InvalidFrequency {
                given: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for PaymentFrequency {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scheduled payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInstallment {
    /// 1-based position in the schedule.
    pub period_number: u32,
    pub amount: Decimal,
}

/// An annual total divided into equal installments.
///
/// Every installment carries the same rounded amount, so the installments
/// may add up to slightly more or less than `annual_total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSchedule {
    pub annual_total: Decimal,
    pub frequency: PaymentFrequency,
    pub installment_count: u32,
    pub installment_amount: Decimal,
    pub installments: Vec<PaymentInstallment>,
}

impl PaymentSchedule {
    /// Sum of all installment amounts.
    pub fn scheduled_total(&self) -> Decimal {
        self.installments.iter().map(|i| i.amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn from_str_accepts_any_case() {
        assert_eq!("MONTHLY".parse(), Ok(PaymentFrequency::Monthly));
        assert_eq!("Quarterly".parse(), Ok(PaymentFrequency::Quarterly));
        assert_eq!(" annual ".parse(), Ok(PaymentFrequency::Annual));
    }

    #[test]
    fn from_str_rejects_unknown_frequency() {
        let result = "weekly".parse::<PaymentFrequency>();

        assert_eq!(
            result,
            Err(ScheduleError::InvalidFrequency {
                given: "weekly".to_string()
            })
        );
    }

    #[test]
    fn invalid_frequency_message_names_allowed_values() {
        let err = "yearly".parse::<PaymentFrequency>().unwrap_err();

        assert_eq!(
            err.to_string(),
            "invalid frequency 'yearly', must be one of: monthly, quarterly, annual"
        );
    }

    #[test]
    fn installment_counts() {
        assert_eq!(PaymentFrequency::Monthly.installment_count(), 12);
        assert_eq!(PaymentFrequency::Quarterly.installment_count(), 4);
        assert_eq!(PaymentFrequency::Annual.installment_count(), 1);
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for frequency in PaymentFrequency::ALL {
            assert_eq!(frequency.to_string().parse(), Ok(frequency));
        }
    }
}
