//! Tax calculators and the payment scheduler.
//!
//! Every calculator borrows a validated [`RateTable`](crate::RateTable) and is
//! a pure function of its inputs. [`TaxCalculator`] ties them together into a
//! single [`TaxResult`](crate::TaxResult).

pub mod common;
pub mod income_tax;
pub mod schedule;
pub mod social_security;
pub mod tax_calculator;
pub mod taxable_income;
pub mod vat;

pub use income_tax::IncomeTaxCalculator;
pub use schedule::{build_schedule, compute_schedule};
pub use social_security::SocialSecurityCalculator;
pub use tax_calculator::{TaxCalculator, compute_taxes};
pub use taxable_income::taxable_income;
pub use vat::VatCalculator;
