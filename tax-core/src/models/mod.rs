mod payment_schedule;
mod rate_table;
mod tax_bracket;
mod tax_result;

pub use payment_schedule::{PaymentFrequency, PaymentInstallment, PaymentSchedule, ScheduleError};
pub use rate_table::{RateTable, RateTableConfig, RateTableError, SocialSecurityRates};
pub use tax_bracket::TaxBracket;
pub use tax_result::{BracketLine, IncomeTaxResult, SocialSecurityResult, TaxResult, VatResult};
