use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;
use tax_cli::app::{self, Options, Outcome};
use tax_cli::logging::{DEFAULT_LOG_FILE, LogConfig, Verbosity, init_logging};
use tax_cli::output::DEFAULT_OUTPUT_DIR;
use tracing::{error, info};

/// Estimate income tax, VAT and social security for a self-employed
/// individual in Greece.
///
/// With no calculation options the calculator runs an interactive menu.
/// Giving some of --income, --expenses and --frequency asks only for the
/// rest; giving all three runs without prompts.
#[derive(Parser, Debug)]
#[command(name = "freelance-tax")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Gross annual income excluding VAT, e.g. 50000 or €50,000.00
    #[arg(long, value_name = "AMOUNT", allow_hyphen_values = true)]
    income: Option<String>,

    /// Deductible business expenses
    #[arg(long, value_name = "AMOUNT", allow_hyphen_values = true)]
    expenses: Option<String>,

    /// Payment frequency: monthly, quarterly or annual
    #[arg(long)]
    frequency: Option<String>,

    /// Report file name inside the output directory
    #[arg(long, value_name = "FILENAME")]
    output: Option<String>,

    /// Directory for report files
    #[arg(long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Fail instead of prompting; needs --income, --expenses and --frequency
    #[arg(long, requires_all = ["income", "expenses", "frequency"])]
    no_interactive: bool,

    /// TOML rate file replacing the built-in 2024 rates
    #[arg(long, value_name = "FILE")]
    rates: Option<PathBuf>,

    /// CSV bracket schedule replacing the table's brackets
    #[arg(long, value_name = "FILE")]
    brackets: Option<PathBuf>,

    /// Log debug detail to the console
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print the report, warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Debug log file
    #[arg(long, value_name = "PATH", default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Do not write a debug log file
    #[arg(long)]
    no_log_file: bool,
}

impl Cli {
    fn log_config(&self) -> LogConfig {
        LogConfig {
            verbosity: Verbosity::from_flags(self.verbose, self.quiet),
            log_file: (!self.no_log_file).then(|| self.log_file.clone()),
        }
    }

    fn options(self) -> Options {
        Options {
            income: self.income,
            expenses: self.expenses,
            frequency: self.frequency,
            output: self.output,
            output_dir: self.output_dir,
            no_interactive: self.no_interactive,
            quiet: self.quiet,
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    init_logging(&cli.log_config());
    info!(version = env!("CARGO_PKG_VERSION"), "Freelancer tax calculator started");

    match run(cli) {
        Ok(outcome) => {
            info!(?outcome, "Finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err:#}");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<Outcome> {
    let table = tax_data::load_rate_table(cli.rates.as_deref(), cli.brackets.as_deref())
        .context("Failed to load rate table")?;
    app::run(&table, &cli.options())
}
