use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tax_data::{RateFileLoader, load_rate_table};

/// Validate a rate table and print its summary.
///
/// Without options the built-in 2024 table is used. A bracket schedule CSV
/// has the columns:
/// - upper_limit: The bracket's upper limit (empty for the top bracket)
/// - rate: The marginal tax rate as a decimal (e.g., 0.22)
/// - label: Optional display label
#[derive(Parser, Debug)]
#[command(name = "tax-rates")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a TOML rate file
    #[arg(short, long)]
    rates: Option<PathBuf>,

    /// Path to a CSV bracket schedule replacing the table's brackets
    #[arg(short, long)]
    brackets: Option<PathBuf>,

    /// Print the effective table as TOML instead of a summary
    #[arg(short, long, default_value_t = false)]
    export: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let table = load_rate_table(args.rates.as_deref(), args.brackets.as_deref())
        .context("Failed to load rate table")?;

    if args.export {
        let toml = RateFileLoader::to_toml_string(&table.to_config())
            .context("Failed to export rate table")?;
        print!("{toml}");
    } else {
        println!("{table}");
    }

    Ok(())
}
