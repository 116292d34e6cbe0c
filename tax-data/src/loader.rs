use std::io::Read;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::TaxBracket;
use tracing::debug;

use crate::{RateTableLoaderError, read_file};

/// A single record from a bracket schedule CSV file.
///
/// The CSV format has the columns:
/// - `upper_limit`: the bracket's upper limit (empty for the top bracket)
/// - `rate`: the marginal rate as a decimal (e.g., 0.22 for 22%)
/// - `label`: optional display label; generated from the limits when empty
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    #[serde(deserialize_with = "deserialize_upper_limit")]
    pub upper_limit: Option<Decimal>,
    pub rate: Decimal,
    #[serde(default)]
    pub label: String,
}

/// Reads an optional upper limit.
///
/// Empty text and the words `inf`, `infinity` and `unlimited` all mean the
/// bracket has no upper limit.
pub(crate) fn deserialize_upper_limit<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if is_unbounded_marker(&s) => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn is_unbounded_marker(s: &str) -> bool {
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "" | "inf" | "infinity" | "unlimited"
    )
}

/// Loader for bracket schedules from CSV files.
pub struct BracketScheduleLoader;

impl BracketScheduleLoader {
    /// Parse bracket records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a byte slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketRecord>, RateTableLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            records.push(record);
        }

        debug!(records = records.len(), "parsed bracket schedule");
        Ok(records)
    }

    /// Converts parsed records into brackets, filling in missing labels.
    ///
    /// Bracket order and limits are left for rate table validation to judge.
    pub fn into_brackets(records: Vec<BracketRecord>) -> Result<Vec<TaxBracket>, RateTableLoaderError> {
        if records.is_empty() {
            return Err(RateTableLoaderError::EmptySchedule);
        }

        let mut lower_bound = Decimal::ZERO;
        let brackets = records
            .into_iter()
            .map(|record| {
                let label = if record.label.is_empty() {
                    default_label(lower_bound, record.upper_limit, record.rate)
                } else {
                    record.label
                };
                if let Some(upper_limit) = record.upper_limit {
                    lower_bound = upper_limit;
                }
                TaxBracket {
                    upper_limit: record.upper_limit,
                    rate: record.rate,
                    label,
                }
            })
            .collect();

        Ok(brackets)
    }

    /// Reads and converts a bracket schedule file.
    pub fn from_file(path: &Path) -> Result<Vec<TaxBracket>, RateTableLoaderError> {
        let content = read_file(path)?;
        let records = Self::parse(content.as_bytes())?;
        Self::into_brackets(records)
    }
}

/// Builds a label such as `€10,000 - €20,000: 22%` or `Over €40,000: 44%`.
pub(crate) fn default_label(
    lower_bound: Decimal,
    upper_limit: Option<Decimal>,
    rate: Decimal,
) -> String {
    let percent = (rate * Decimal::ONE_HUNDRED).normalize();
    match upper_limit {
        Some(upper) => format!(
            "€{} - €{}: {percent}%",
            group_thousands(lower_bound),
            group_thousands(upper)
        ),
        None => format!("Over €{}: {percent}%", group_thousands(lower_bound)),
    }
}

fn group_thousands(amount: Decimal) -> String {
    let text = amount.normalize().to_string();
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match fraction {
        Some(fraction) => format!("{grouped}.{fraction}"),
        None => grouped,
    }
}
