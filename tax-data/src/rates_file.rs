//! TOML rate files.
//!
//! ```toml
//! tax_year = 2024
//! vat_rate = "0.24"
//! max_annual_income = "10000000"
//!
//! [social_security]
//! main_rate = "0.1333"
//! additional_rate = "0.0667"
//! total_rate = "0.20"
//!
//! [[brackets]]
//! upper_limit = "10000"
//! rate = "0.09"
//! label = "€0 - €10,000: 9%"
//!
//! [[brackets]]
//! rate = "0.44"
//! label = "Over €10,000: 44%"
//! ```
//!
//! Decimals are written as quoted strings so no value passes through a
//! binary float. `upper_limit` may be omitted (or set to `""`, `"inf"` or
//! `"unlimited"`) for the top bracket; `label` may be omitted everywhere.

use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tax_core::{RateTableConfig, SocialSecurityRates, TaxBracket};
use tracing::debug;

use crate::loader::{default_label, deserialize_upper_limit};
use crate::{RateTableLoaderError, read_file};

#[derive(Debug, Deserialize, Serialize)]
struct RateFile {
    tax_year: i32,
    vat_rate: Decimal,
    max_annual_income: Decimal,
    social_security: SocialSecurityRates,
    brackets: Vec<BracketEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
struct BracketEntry {
    #[serde(
        default,
        deserialize_with = "deserialize_upper_limit",
        skip_serializing_if = "Option::is_none"
    )]
    upper_limit: Option<Decimal>,
    rate: Decimal,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    label: String,
}

impl From<RateFile> for RateTableConfig {
    fn from(file: RateFile) -> Self {
        let mut lower_bound = Decimal::ZERO;
        let brackets = file
            .brackets
            .into_iter()
            .map(|entry| {
                let label = if entry.label.is_empty() {
                    default_label(lower_bound, entry.upper_limit, entry.rate)
                } else {
                    entry.label
                };
                if let Some(upper_limit) = entry.upper_limit {
                    lower_bound = upper_limit;
                }
                TaxBracket {
                    upper_limit: entry.upper_limit,
                    rate: entry.rate,
                    label,
                }
            })
            .collect();

        RateTableConfig {
            tax_year: file.tax_year,
            brackets,
            vat_rate: file.vat_rate,
            social_security: file.social_security,
            max_annual_income: file.max_annual_income,
        }
    }
}

impl From<&RateTableConfig> for RateFile {
    fn from(config: &RateTableConfig) -> Self {
        RateFile {
            tax_year: config.tax_year,
            vat_rate: config.vat_rate,
            max_annual_income: config.max_annual_income,
            social_security: config.social_security.clone(),
            brackets: config
                .brackets
                .iter()
                .map(|bracket| BracketEntry {
                    upper_limit: bracket.upper_limit,
                    rate: bracket.rate,
                    label: bracket.label.clone(),
                })
                .collect(),
        }
    }
}

/// Reads and writes complete rate tables as TOML.
pub struct RateFileLoader;

impl RateFileLoader {
    /// Parses a rate file. The result is not validated yet.
    pub fn from_toml_str(content: &str) -> Result<RateTableConfig, RateTableLoaderError> {
        let file: RateFile = toml::from_str(content)?;
        debug!(
            tax_year = file.tax_year,
            brackets = file.brackets.len(),
            "parsed rate file"
        );
        Ok(file.into())
    }

    pub fn from_file(path: &Path) -> Result<RateTableConfig, RateTableLoaderError> {
        let content = read_file(path)?;
        Self::from_toml_str(&content)
    }

    /// Renders a configuration in the rate file format.
    pub fn to_toml_string(config: &RateTableConfig) -> Result<String, RateTableLoaderError> {
        toml::to_string_pretty(&RateFile::from(config))
            .map_err(|err| RateTableLoaderError::TomlExport(err.to_string()))
    }
}
