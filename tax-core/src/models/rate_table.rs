//! Rate table configuration and its validated, immutable form.
//!
//! A [`RateTableConfig`] is plain data: it is what gets deserialized from a
//! rate file or built in code. A [`RateTable`] can only be obtained through
//! [`RateTable::new`], which checks every invariant up front so calculators
//! never have to re-validate bracket order or rate ranges.
//!
//! # Example
//!
//! ```
//! use tax_core::{RateTable, RateTableConfig};
//!
//! let table = RateTable::new(RateTableConfig::greece_2024()).unwrap();
//!
//! assert_eq!(table.brackets().len(), 5);
//! assert!(table.brackets().last().unwrap().is_unbounded());
//! ```

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::to_percent;
use crate::models::{PaymentFrequency, TaxBracket};

/// Largest accepted difference between the configured total social-security
/// rate and the sum of its two components.
const SOCIAL_RATE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

/// Errors raised while validating a rate table.
///
/// All of these are fatal configuration errors: the calculator refuses to
/// start with a table that fails validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RateTableError {
    /// The bracket list is empty.
    #[error("rate table has no income tax brackets")]
    NoBrackets,

    /// A bracket rate lies outside [0, 1].
    #[error("bracket {index} rate must be between 0 and 1, got {rate} (use 0.09 for 9%, not 9)")]
    InvalidBracketRate { index: usize, rate: Decimal },

    /// A bounded bracket has a zero or negative upper limit.
    #[error("bracket {index} upper limit must be positive, got {upper_limit}")]
    NonPositiveUpperLimit { index: usize, upper_limit: Decimal },

    /// A bracket's upper limit does not exceed the previous bracket's.
    #[error(
        "bracket {index} upper limit ({upper_limit}) must be greater than the previous bracket ({previous})"
    )]
    NonAscendingBracket {
        index: usize,
        upper_limit: Decimal,
        previous: Decimal,
    },

    /// An unbounded bracket appears before the end of the schedule.
    #[error("bracket {index} is unbounded but is not the last bracket")]
    UnboundedBracketNotLast { index: usize },

    /// The top bracket has a finite upper limit.
    #[error("last bracket must be unbounded")]
    LastBracketBounded,

    /// A flat rate (VAT or social security) lies outside [0, 1].
    #[error("{name} must be between 0 and 1, got {rate}")]
    InvalidRate { name: &'static str, rate: Decimal },

    /// The social-security components do not add up to the configured total.
    #[error(
        "social security total rate ({total}) must equal main rate + additional rate ({main} + {additional})"
    )]
    SocialRateMismatch {
        main: Decimal,
        additional: Decimal,
        total: Decimal,
    },

    /// The input sanity limit is zero or negative.
    #[error("maximum annual income must be positive, got {0}")]
    InvalidMaxAnnualIncome(Decimal),
}

/// Social-security contribution rates, split into the two components that
/// are reported separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialSecurityRates {
    /// Main insurance rate.
    pub main_rate: Decimal,

    /// Additional contributions rate.
    pub additional_rate: Decimal,

    /// Combined rate. Derived from the two components when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_rate: Option<Decimal>,
}

impl SocialSecurityRates {
    /// The combined rate, falling back to `main_rate + additional_rate`.
    pub fn effective_total(&self) -> Decimal {
        self.total_rate
            .unwrap_or(self.main_rate + self.additional_rate)
    }
}

/// Unvalidated rate table data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTableConfig {
    /// Tax year the rates apply to.
    pub tax_year: i32,

    /// Progressive income tax brackets in ascending order.
    pub brackets: Vec<TaxBracket>,

    /// Flat VAT rate applied to gross income.
    pub vat_rate: Decimal,

    /// Flat social-security rates applied to gross income.
    pub social_security: SocialSecurityRates,

    /// Upper sanity limit for user-entered income and expenses.
    pub max_annual_income: Decimal,
}

impl RateTableConfig {
    /// Greek freelancer rates for the 2024 tax year.
    pub fn greece_2024() -> Self {
        Self {
            tax_year: 2024,
            brackets: vec![
                TaxBracket::bounded(Decimal::new(10_000, 0), Decimal::new(9, 2), "€0 - €10,000: 9%"),
                TaxBracket::bounded(
                    Decimal::new(20_000, 0),
                    Decimal::new(22, 2),
                    "€10,001 - €20,000: 22%",
                ),
                TaxBracket::bounded(
                    Decimal::new(30_000, 0),
                    Decimal::new(28, 2),
                    "€20,001 - €30,000: 28%",
                ),
                TaxBracket::bounded(
                    Decimal::new(40_000, 0),
                    Decimal::new(36, 2),
                    "€30,001 - €40,000: 36%",
                ),
                TaxBracket::unbounded(Decimal::new(44, 2), "Over €40,000: 44%"),
            ],
            vat_rate: Decimal::new(24, 2),
            social_security: SocialSecurityRates {
                main_rate: Decimal::new(1333, 4),
                additional_rate: Decimal::new(667, 4),
                total_rate: Some(Decimal::new(20, 2)),
            },
            max_annual_income: Decimal::new(10_000_000, 0),
        }
    }

    /// Returns a copy of this configuration with the bracket schedule replaced.
    pub fn with_brackets(
        self,
        brackets: Vec<TaxBracket>,
    ) -> Self {
        Self { brackets, ..self }
    }

    /// Checks every rate table invariant.
    ///
    /// # Errors
    ///
    /// Returns the first [`RateTableError`] encountered, checking brackets
    /// first, then the flat rates, then the income limit.
    pub fn validate(&self) -> Result<(), RateTableError> {
        self.validate_brackets()?;

        check_rate("VAT rate", self.vat_rate)?;
        check_rate("social security main rate", self.social_security.main_rate)?;
        check_rate(
            "social security additional rate",
            self.social_security.additional_rate,
        )?;

        let total = self.social_security.effective_total();
        check_rate("social security total rate", total)?;

        let expected = self.social_security.main_rate + self.social_security.additional_rate;
        if (total - expected).abs() > SOCIAL_RATE_TOLERANCE {
            return Err(RateTableError::SocialRateMismatch {
                main: self.social_security.main_rate,
                additional: self.social_security.additional_rate,
                total,
            });
        }

        if self.max_annual_income <= Decimal::ZERO {
            return Err(RateTableError::InvalidMaxAnnualIncome(
                self.max_annual_income,
            ));
        }

        Ok(())
    }

    fn validate_brackets(&self) -> Result<(), RateTableError> {
        let last_index = match self.brackets.len() {
            0 => return Err(RateTableError::NoBrackets),
            n => n - 1,
        };

        let mut previous = Decimal::ZERO;
        for (index, bracket) in self.brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(RateTableError::InvalidBracketRate {
                    index,
                    rate: bracket.rate,
                });
            }

            match bracket.upper_limit {
                Some(upper_limit) if upper_limit <= Decimal::ZERO => {
                    return Err(RateTableError::NonPositiveUpperLimit { index, upper_limit });
                }
                Some(upper_limit) if upper_limit <= previous => {
                    return Err(RateTableError::NonAscendingBracket {
                        index,
                        upper_limit,
                        previous,
                    });
                }
                Some(upper_limit) => previous = upper_limit,
                None if index != last_index => {
                    return Err(RateTableError::UnboundedBracketNotLast { index });
                }
                None => {}
            }
        }

        if !self.brackets[last_index].is_unbounded() {
            return Err(RateTableError::LastBracketBounded);
        }

        Ok(())
    }
}

fn check_rate(
    name: &'static str,
    rate: Decimal,
) -> Result<(), RateTableError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(RateTableError::InvalidRate { name, rate });
    }
    Ok(())
}

/// A validated, read-only rate table.
///
/// Fields are private; the only way to build one is [`RateTable::new`], so
/// any `RateTable` in hand satisfies every invariant checked by
/// [`RateTableConfig::validate`]. Share it by reference across calculations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateTable {
    tax_year: i32,
    brackets: Vec<TaxBracket>,
    vat_rate: Decimal,
    social_main_rate: Decimal,
    social_additional_rate: Decimal,
    social_total_rate: Decimal,
    max_annual_income: Decimal,
}

impl RateTable {
    /// Validates `config` and freezes it into a rate table.
    ///
    /// # Errors
    ///
    /// Returns [`RateTableError`] if any invariant does not hold.
    pub fn new(config: RateTableConfig) -> Result<Self, RateTableError> {
        config.validate()?;

        let social_total_rate = config.social_security.effective_total();
        Ok(Self {
            tax_year: config.tax_year,
            brackets: config.brackets,
            vat_rate: config.vat_rate,
            social_main_rate: config.social_security.main_rate,
            social_additional_rate: config.social_security.additional_rate,
            social_total_rate,
            max_annual_income: config.max_annual_income,
        })
    }

    pub fn tax_year(&self) -> i32 {
        self.tax_year
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    pub fn vat_rate(&self) -> Decimal {
        self.vat_rate
    }

    pub fn social_main_rate(&self) -> Decimal {
        self.social_main_rate
    }

    pub fn social_additional_rate(&self) -> Decimal {
        self.social_additional_rate
    }

    pub fn social_total_rate(&self) -> Decimal {
        self.social_total_rate
    }

    pub fn max_annual_income(&self) -> Decimal {
        self.max_annual_income
    }

    /// Converts the table back into its plain-data form, e.g. for export.
    pub fn to_config(&self) -> RateTableConfig {
        RateTableConfig {
            tax_year: self.tax_year,
            brackets: self.brackets.clone(),
            vat_rate: self.vat_rate,
            social_security: SocialSecurityRates {
                main_rate: self.social_main_rate,
                additional_rate: self.social_additional_rate,
                total_rate: Some(self.social_total_rate),
            },
            max_annual_income: self.max_annual_income,
        }
    }
}

impl fmt::Display for RateTable {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let rule = "-".repeat(60);

        writeln!(f, "Tax rate configuration ({})", self.tax_year)?;
        writeln!(f, "{}", "=".repeat(60))?;
        writeln!(f, "Income tax brackets:")?;
        writeln!(f, "{rule}")?;
        for bracket in &self.brackets {
            writeln!(f, "  {}", bracket.label)?;
        }
        writeln!(f)?;
        writeln!(f, "Other rates:")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "  VAT rate: {}%", to_percent(self.vat_rate))?;
        writeln!(
            f,
            "  Social security main rate: {}%",
            to_percent(self.social_main_rate)
        )?;
        writeln!(
            f,
            "  Social security additional rate: {}%",
            to_percent(self.social_additional_rate)
        )?;
        writeln!(
            f,
            "  Social security total rate: {}%",
            to_percent(self.social_total_rate)
        )?;
        writeln!(f)?;
        writeln!(f, "Validation limits:")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "  Maximum annual income: {}", self.max_annual_income)?;
        writeln!(f)?;
        writeln!(f, "Payment frequencies:")?;
        writeln!(f, "{rule}")?;
        let frequencies: Vec<&str> = PaymentFrequency::ALL.iter().map(|f| f.as_str()).collect();
        writeln!(f, "  {}", frequencies.join(", "))?;
        write!(f, "{}", "=".repeat(60))
    }
}
