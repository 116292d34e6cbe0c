//! Mode selection and the calculation workflow.
//!
//! - Interactive: no calculation arguments, a menu loop.
//! - Hybrid: some arguments, the rest prompted, then a confirmation.
//! - Non-interactive: income, expenses and frequency all given.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use rust_decimal::Decimal;
use tax_core::calculations::common::to_percent;
use tax_core::{PaymentFrequency, RateTable, build_schedule, compute_taxes};
use tracing::{debug, error, info, warn};

use crate::output::{ConsoleWriter, Destination, FileWriter, OutputError, ReportWriter};
use crate::prompts::{
    DialoguerPrompter, LinePrompter, MenuChoice, PromptError, Prompter, confirm_inputs,
    prompt_expenses, prompt_frequency, prompt_income, prompt_menu,
};
use crate::report::render_report;
use crate::utils::format_currency;
use crate::validation::{validate_amount, validate_expenses, validate_frequency};

/// Everything the workflow needs from the command line.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub income: Option<String>,
    pub expenses: Option<String>,
    pub frequency: Option<String>,
    /// Custom report file name.
    pub output: Option<String>,
    pub output_dir: PathBuf,
    pub no_interactive: bool,
    pub quiet: bool,
}

impl Options {
    fn has_calculation_args(&self) -> bool {
        self.income.is_some()
            || self.expenses.is_some()
            || self.frequency.is_some()
            || self.no_interactive
    }
}

/// How a run ended when nothing went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// The user declined, closed the input, or interrupted a prompt.
    Cancelled,
}

/// Runs the calculator against the real terminal.
pub fn run(
    table: &RateTable,
    options: &Options,
) -> Result<Outcome> {
    let mut console = io::stdout();
    if io::stdin().is_terminal() {
        let mut prompter = DialoguerPrompter::new();
        Session::new(table, options, &mut prompter, &mut console).run()
    } else {
        debug!("stdin is not a terminal; reading answers line by line");
        let mut prompter = LinePrompter::new(io::stdin().lock(), io::stderr());
        Session::new(table, options, &mut prompter, &mut console).run()
    }
}

/// One run of the calculator.
pub struct Session<'a> {
    table: &'a RateTable,
    options: &'a Options,
    prompter: &'a mut dyn Prompter,
    console: &'a mut dyn Write,
}

impl<'a> Session<'a> {
    pub fn new(
        table: &'a RateTable,
        options: &'a Options,
        prompter: &'a mut dyn Prompter,
        console: &'a mut dyn Write,
    ) -> Self {
        Self {
            table,
            options,
            prompter,
            console,
        }
    }

    pub fn run(&mut self) -> Result<Outcome> {
        let outcome = if self.options.has_calculation_args() {
            info!("Running with command-line arguments");
            self.run_with_args()
        } else {
            info!("Running in interactive mode");
            self.run_interactive()
        };

        match outcome {
            Err(err) if is_cancellation(&err) => {
                info!("Input cancelled by user");
                self.status("\nInput cancelled.")?;
                Ok(Outcome::Cancelled)
            }
            other => other,
        }
    }

    fn run_interactive(&mut self) -> Result<Outcome> {
        self.status(&banner("FREELANCER TAX CALCULATOR"))?;

        loop {
            match prompt_menu(&mut *self.prompter)? {
                MenuChoice::NewCalculation => {
                    info!("New calculation selected");
                    let max = self.table.max_annual_income();
                    let income = prompt_income(&mut *self.prompter, max)?;
                    let expenses = prompt_expenses(&mut *self.prompter, income, max)?;
                    let frequency = prompt_frequency(&mut *self.prompter)?;

                    if confirm_inputs(&mut *self.prompter, income, expenses, frequency)? {
                        self.calculate(income, expenses, frequency)?;
                    } else {
                        info!("Calculation cancelled by user");
                        self.status("\nCalculation cancelled. Returning to main menu.")?;
                    }
                }
                MenuChoice::Exit => {
                    info!("Exit selected");
                    self.status("\nThank you for using the freelancer tax calculator!")?;
                    return Ok(Outcome::Completed);
                }
            }
        }
    }

    fn run_with_args(&mut self) -> Result<Outcome> {
        let max = self.table.max_annual_income();
        let options = self.options;

        let income = options
            .income
            .as_deref()
            .map(|value| {
                validate_amount("Income", value, max)
                    .with_context(|| format!("invalid --income value '{value}'"))
            })
            .transpose()?;
        let expenses = options
            .expenses
            .as_deref()
            .map(|value| {
                validate_amount("Expenses", value, max)
                    .with_context(|| format!("invalid --expenses value '{value}'"))
            })
            .transpose()?;
        let frequency = options
            .frequency
            .as_deref()
            .map(|value| {
                validate_frequency(value)
                    .with_context(|| format!("invalid --frequency value '{value}'"))
            })
            .transpose()?;

        if let (Some(income), Some(expenses)) = (income, expenses) {
            validate_expenses(expenses, income).context("invalid --expenses value")?;
        }

        if let (Some(income), Some(expenses), Some(frequency)) = (income, expenses, frequency) {
            info!("All calculation arguments provided");
            self.status(&format!(
                "{}\nGross Annual Income:       {}\nDeductible Expenses:       {}\nPayment Frequency:         {}",
                banner("CALCULATION PARAMETERS (from command line)"),
                format_currency(income),
                format_currency(expenses),
                frequency.label()
            ))?;
            self.calculate(income, expenses, frequency)?;
            return Ok(Outcome::Completed);
        }

        info!("Hybrid mode: prompting for missing arguments");
        self.status(&banner("Some values were given on the command line; the rest will be asked for"))?;

        let income = match income {
            Some(income) => income,
            None => prompt_income(&mut *self.prompter, max)?,
        };
        let expenses = match expenses {
            Some(expenses) => {
                validate_expenses(expenses, income).context("invalid --expenses value")?;
                expenses
            }
            None => prompt_expenses(&mut *self.prompter, income, max)?,
        };
        let frequency = match frequency {
            Some(frequency) => frequency,
            None => prompt_frequency(&mut *self.prompter)?,
        };

        if !confirm_inputs(&mut *self.prompter, income, expenses, frequency)? {
            info!("Calculation cancelled in hybrid mode");
            self.status("\nCalculation cancelled.")?;
            return Ok(Outcome::Cancelled);
        }

        self.calculate(income, expenses, frequency)?;
        Ok(Outcome::Completed)
    }

    /// Computes, prints and saves one report.
    fn calculate(
        &mut self,
        income: Decimal,
        expenses: Decimal,
        frequency: PaymentFrequency,
    ) -> Result<()> {
        info!("Starting tax calculation");
        if income.is_zero() {
            self.status("\nZero gross income entered: every tax figure will be zero.")?;
        }

        let result = compute_taxes(self.table, income, expenses);
        let schedule = build_schedule(result.total_taxes, frequency);
        let social_rates = (
            to_percent(self.table.social_main_rate()),
            to_percent(self.table.social_additional_rate()),
        );
        let now = Local::now().naive_local();
        let report = render_report(&result, &schedule, social_rates, now);

        writeln!(self.console)?;
        ConsoleWriter::new(&mut *self.console)
            .write_report(&report)
            .context("Failed to print report")?;

        match self.save(&report, now) {
            Ok(Destination::File(path)) => {
                info!(file = %file_label(&path), "Results saved");
                self.status(&format!("\nResults saved to: {}", path.display()))?;
            }
            Ok(Destination::Console) => {}
            Err(err) => {
                warn!(error = %err, "Failed to save results to file");
                writeln!(self.console, "\nWarning: could not save results to file: {err}")?;
            }
        }
        Ok(())
    }

    fn save(
        &mut self,
        report: &str,
        now: chrono::NaiveDateTime,
    ) -> Result<Destination, OutputError> {
        let dir = &self.options.output_dir;

        if let Some(requested) = &self.options.output {
            let custom = FileWriter::with_custom_name(dir, requested).and_then(|mut writer| {
                debug!(file = writer.file_name(), "Saving report under custom name");
                writer.write_report(report)
            });
            match custom {
                Ok(destination) => return Ok(destination),
                Err(err) => {
                    error!(error = %err, "Could not save to custom output file");
                    let _ = writeln!(
                        self.console,
                        "\nWarning: could not save to '{requested}': {err}\nSaving to the default location instead."
                    );
                }
            }
        }

        FileWriter::with_default_name(dir, now).write_report(report)
    }

    /// Prints a status line unless running quietly.
    fn status(
        &mut self,
        message: &str,
    ) -> io::Result<()> {
        if self.options.quiet {
            return Ok(());
        }
        writeln!(self.console, "{message}")
    }
}

fn is_cancellation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<PromptError>()
        .is_some_and(PromptError::is_cancellation)
}

fn banner(title: &str) -> String {
    let rule = "=".repeat(70);
    format!("\n{rule}\n{title}\n{rule}")
}

/// File name only, so logs do not record where the user keeps reports.
fn file_label(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;
    use tax_core::RateTableConfig;

    use super::*;

    struct Harness {
        table: RateTable,
        dir: tempfile::TempDir,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                table: RateTable::new(RateTableConfig::greece_2024()).unwrap(),
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn options(&self) -> Options {
            Options {
                output_dir: self.dir.path().join("output"),
                ..Options::default()
            }
        }

        /// Runs a session with scripted answers; returns the outcome, the
        /// console text and the prompt transcript.
        fn run(
            &self,
            options: &Options,
            answers: &str,
        ) -> (Result<Outcome>, String, String) {
            let mut transcript = Vec::new();
            let mut console = Vec::new();
            let outcome = {
                let mut prompter = LinePrompter::new(Cursor::new(answers.as_bytes()), &mut transcript);
                Session::new(&self.table, options, &mut prompter, &mut console).run()
            };
            (
                outcome,
                String::from_utf8_lossy(&console).into_owned(),
                String::from_utf8_lossy(&transcript).into_owned(),
            )
        }

        fn saved_reports(&self) -> Vec<PathBuf> {
            let dir = self.dir.path().join("output");
            match std::fs::read_dir(dir) {
                Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
                Err(_) => Vec::new(),
            }
        }
    }

    fn args(
        income: Option<&str>,
        expenses: Option<&str>,
        frequency: Option<&str>,
    ) -> impl FnOnce(Options) -> Options {
        move |options| Options {
            income: income.map(str::to_string),
            expenses: expenses.map(str::to_string),
            frequency: frequency.map(str::to_string),
            ..options
        }
    }

    // =========================================================================
    // non-interactive mode
    // =========================================================================

    #[test]
    fn non_interactive_prints_and_saves_report() {
        let harness = Harness::new();
        let options = args(Some("35000"), Some("5000"), Some("quarterly"))(harness.options());

        let (outcome, console, transcript) = harness.run(&options, "");

        assert_eq!(outcome.unwrap(), Outcome::Completed);
        assert!(console.contains("CALCULATION PARAMETERS"));
        assert!(console.contains("€12,900.00"));
        assert!(console.contains("€3,225.00"));
        assert!(console.contains("Results saved to:"));
        assert_eq!(transcript, "");
        assert_eq!(harness.saved_reports().len(), 1);
    }

    #[test]
    fn non_interactive_quiet_prints_only_report() {
        let harness = Harness::new();
        let options = Options {
            quiet: true,
            ..args(Some("15000"), Some("0"), Some("monthly"))(harness.options())
        };

        let (outcome, console, _) = harness.run(&options, "");

        assert_eq!(outcome.unwrap(), Outcome::Completed);
        assert!(!console.contains("CALCULATION PARAMETERS"));
        assert!(!console.contains("Results saved to:"));
        assert!(console.contains("€416.67"));
    }

    #[test]
    fn invalid_income_argument_names_flag() {
        let harness = Harness::new();
        let options = args(Some("abc"), Some("0"), Some("monthly"))(harness.options());

        let (outcome, _, _) = harness.run(&options, "");

        let err = outcome.unwrap_err();
        assert!(format!("{err:#}").starts_with("invalid --income value 'abc'"));
        assert!(harness.saved_reports().is_empty());
    }

    #[test]
    fn expenses_above_income_argument_is_rejected() {
        let harness = Harness::new();
        let options = args(Some("1000"), Some("2000"), Some("annual"))(harness.options());

        let (outcome, _, _) = harness.run(&options, "");

        let err = format!("{:#}", outcome.unwrap_err());
        assert!(err.contains("--expenses"));
        assert!(err.contains("cannot exceed gross income"));
    }

    #[test]
    fn invalid_frequency_argument_lists_choices() {
        let harness = Harness::new();
        let options = args(Some("1000"), Some("0"), Some("weekly"))(harness.options());

        let (outcome, _, _) = harness.run(&options, "");

        let err = format!("{:#}", outcome.unwrap_err());
        assert!(err.contains("--frequency"));
        assert!(err.contains("monthly, quarterly, annual"));
    }

    #[test]
    fn custom_output_name_is_used() {
        let harness = Harness::new();
        let options = Options {
            output: Some("my_taxes.txt".to_string()),
            ..args(Some("20000"), Some("0"), Some("annual"))(harness.options())
        };

        let (outcome, _, _) = harness.run(&options, "");

        assert_eq!(outcome.unwrap(), Outcome::Completed);
        let saved = harness.saved_reports();
        assert_eq!(saved, vec![harness.dir.path().join("output").join("my_taxes.txt")]);
    }

    #[test]
    fn bad_custom_output_name_falls_back_to_default() {
        let harness = Harness::new();
        let options = Options {
            output: Some("bad name?.txt".to_string()),
            ..args(Some("20000"), Some("0"), Some("annual"))(harness.options())
        };

        let (outcome, console, _) = harness.run(&options, "");

        assert_eq!(outcome.unwrap(), Outcome::Completed);
        assert!(console.contains("Saving to the default location instead."));
        let saved = harness.saved_reports();
        assert_eq!(saved.len(), 1);
        let name = saved[0].file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("tax_calculation_"));
    }

    // =========================================================================
    // hybrid mode
    // =========================================================================

    #[test]
    fn hybrid_prompts_for_missing_values() {
        let harness = Harness::new();
        let options = args(Some("60000"), None, None)(harness.options());

        let (outcome, console, transcript) = harness.run(&options, "10000\n3\ny\n");

        assert_eq!(outcome.unwrap(), Outcome::Completed);
        assert!(transcript.contains("Deductible expenses, up to €60,000.00"));
        assert!(console.contains("€25,900.00"));
        assert!(console.contains("PAYMENT SCHEDULE (ANNUAL)"));
    }

    #[test]
    fn hybrid_declined_confirmation_cancels() {
        let harness = Harness::new();
        let options = args(None, Some("0"), Some("monthly"))(harness.options());

        let (outcome, console, _) = harness.run(&options, "5000\nno\n");

        assert_eq!(outcome.unwrap(), Outcome::Cancelled);
        assert!(console.contains("Calculation cancelled."));
        assert!(harness.saved_reports().is_empty());
    }

    #[test]
    fn hybrid_expenses_checked_against_prompted_income() {
        let harness = Harness::new();
        let options = args(None, Some("9000"), Some("monthly"))(harness.options());

        let (outcome, _, _) = harness.run(&options, "5000\n");

        let err = format!("{:#}", outcome.unwrap_err());
        assert!(err.contains("cannot exceed gross income"));
    }

    #[test]
    fn hybrid_end_of_input_is_a_cancellation() {
        let harness = Harness::new();
        let options = args(Some("5000"), None, None)(harness.options());

        let (outcome, console, _) = harness.run(&options, "");

        assert_eq!(outcome.unwrap(), Outcome::Cancelled);
        assert!(console.contains("Input cancelled."));
    }

    // =========================================================================
    // interactive mode
    // =========================================================================

    #[test]
    fn interactive_runs_calculations_until_exit() {
        let harness = Harness::new();
        let options = harness.options();

        let (outcome, console, _) =
            harness.run(&options, "1\n15000\n0\n1\ny\n1\n0\n0\n3\ny\n2\n");

        assert_eq!(outcome.unwrap(), Outcome::Completed);
        assert!(console.contains("€2,000.00"));
        assert!(console.contains("Zero gross income entered"));
        assert!(console.contains("Thank you for using"));
        assert_eq!(harness.saved_reports().len(), 2);
    }

    #[test]
    fn interactive_declined_calculation_returns_to_menu() {
        let harness = Harness::new();
        let options = harness.options();

        let (outcome, console, _) = harness.run(&options, "1\n100\n0\n2\nn\n2\n");

        assert_eq!(outcome.unwrap(), Outcome::Completed);
        assert!(console.contains("Returning to main menu."));
        assert!(harness.saved_reports().is_empty());
    }
}
