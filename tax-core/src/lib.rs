//! Tax obligations of a self-employed individual.
//!
//! The crate turns gross income and deductible expenses into progressive
//! income tax, flat-rate VAT and flat-rate social security, aggregates them
//! into a [`TaxResult`], and splits an annual total into a
//! [`PaymentSchedule`]. Everything here is pure and synchronous; the only
//! shared input is a validated [`RateTable`].
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::{RateTable, RateTableConfig, compute_schedule, compute_taxes};
//!
//! let table = RateTable::new(RateTableConfig::greece_2024()).unwrap();
//!
//! let result = compute_taxes(&table, dec!(35000), dec!(5000));
//! assert_eq!(result.taxable_income, dec!(30000.00));
//! assert_eq!(result.total_taxes, dec!(12900.00));
//!
//! let schedule = compute_schedule(result.total_taxes, "quarterly").unwrap();
//! assert_eq!(schedule.installment_amount, dec!(3225.00));
//! ```

pub mod calculations;
pub mod models;

pub use calculations::{TaxCalculator, build_schedule, compute_schedule, compute_taxes};
pub use models::*;
