//! Loading rate tables from disk.
//!
//! Two formats are supported:
//!
//! - a complete rate table as TOML ([`RateFileLoader`]),
//! - a bracket schedule as CSV ([`BracketScheduleLoader`]) that replaces the
//!   brackets of an otherwise loaded or built-in table.
//!
//! [`load_rate_table`] combines both the way the command-line tools do.

use std::path::{Path, PathBuf};

use tax_core::{RateTable, RateTableConfig, RateTableError};
use thiserror::Error;
use tracing::info;

mod loader;
mod rates_file;

pub use loader::{BracketRecord, BracketScheduleLoader};
pub use rates_file::RateFileLoader;

/// Errors that can occur when loading rate data.
#[derive(Debug, Error)]
pub enum RateTableLoaderError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("TOML export error: {0}")]
    TomlExport(String),

    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("bracket schedule is empty")]
    EmptySchedule,

    #[error("invalid rate table: {0}")]
    InvalidRateTable(#[from] RateTableError),
}

impl From<csv::Error> for RateTableLoaderError {
    fn from(err: csv::Error) -> Self {
        RateTableLoaderError::CsvParse(err.to_string())
    }
}

impl From<toml::de::Error> for RateTableLoaderError {
    fn from(err: toml::de::Error) -> Self {
        RateTableLoaderError::TomlParse(err.to_string())
    }
}

/// Builds the rate table selected by the optional rate file and bracket file.
///
/// Without a rate file the built-in 2024 table is the base; a bracket file
/// replaces the base table's brackets. The result is fully validated.
///
/// # Errors
///
/// Returns [`RateTableLoaderError`] when a file cannot be read or parsed, or
/// when the combined table fails validation.
pub fn load_rate_table(
    rates: Option<&Path>,
    brackets: Option<&Path>,
) -> Result<RateTable, RateTableLoaderError> {
    let mut config = match rates {
        Some(path) => {
            info!(path = %path.display(), "Loading rate table");
            RateFileLoader::from_file(path)?
        }
        None => RateTableConfig::greece_2024(),
    };

    if let Some(path) = brackets {
        info!(path = %path.display(), "Loading bracket schedule");
        let schedule = BracketScheduleLoader::from_file(path)?;
        config = config.with_brackets(schedule);
    }

    let table = RateTable::new(config)?;
    info!(
        tax_year = table.tax_year(),
        brackets = table.brackets().len(),
        "Rate table validated"
    );
    Ok(table)
}

fn read_file(path: &Path) -> Result<String, RateTableLoaderError> {
    std::fs::read_to_string(path).map_err(|source| RateTableLoaderError::Io {
        path: path.to_path_buf(),
        source,
    })
}
