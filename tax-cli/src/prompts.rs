//! Interactive input collection.
//!
//! [`Prompter`] abstracts the terminal so the collection logic can run
//! against a real TTY ([`DialoguerPrompter`]) or any line-oriented reader
//! ([`LinePrompter`]), which is also what the tests script.

use std::io::{self, BufRead, Write};

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use rust_decimal::Decimal;
use tax_core::PaymentFrequency;
use thiserror::Error;
use tracing::{debug, info};

use crate::utils::format_currency;
use crate::validation::{validate_amount, validate_expenses};

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt failed: {0}")]
    Dialog(#[from] dialoguer::Error),

    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),

    #[error("input ended before a value was entered")]
    EndOfInput,
}

impl PromptError {
    /// True when the user closed the input or pressed Ctrl-C rather than
    /// something actually failing.
    pub fn is_cancellation(&self) -> bool {
        let kind = match self {
            Self::EndOfInput => return true,
            Self::Io(err) => err.kind(),
            Self::Dialog(dialoguer::Error::IO(err)) => err.kind(),
        };
        matches!(kind, io::ErrorKind::Interrupted | io::ErrorKind::UnexpectedEof)
    }
}

pub trait Prompter {
    /// Asks for a line of free text.
    fn input(
        &mut self,
        prompt: &str,
    ) -> Result<String, PromptError>;

    fn confirm(
        &mut self,
        prompt: &str,
        default: bool,
    ) -> Result<bool, PromptError>;

    /// Returns the index of the chosen item.
    fn select(
        &mut self,
        prompt: &str,
        items: &[&str],
        default: usize,
    ) -> Result<usize, PromptError>;

    /// Shows a message that is not a question, e.g. a validation error.
    fn notify(
        &mut self,
        message: &str,
    );
}

/// Prompts on the controlling terminal.
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for DialoguerPrompter {
    fn input(
        &mut self,
        prompt: &str,
    ) -> Result<String, PromptError> {
        Ok(Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?)
    }

    fn confirm(
        &mut self,
        prompt: &str,
        default: bool,
    ) -> Result<bool, PromptError> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }

    fn select(
        &mut self,
        prompt: &str,
        items: &[&str],
        default: usize,
    ) -> Result<usize, PromptError> {
        Ok(Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact()?)
    }

    fn notify(
        &mut self,
        message: &str,
    ) {
        eprintln!("{message}");
    }
}

/// Prompts over plain lines, for piped stdin and scripted sessions.
pub struct LinePrompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(
        reader: R,
        writer: W,
    ) -> Self {
        Self { reader, writer }
    }

    fn read_line(&mut self) -> Result<String, PromptError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(PromptError::EndOfInput);
        }
        Ok(line.trim().to_string())
    }

    fn ask(
        &mut self,
        prompt: &str,
    ) -> Result<String, PromptError> {
        write!(self.writer, "{prompt}: ")?;
        self.writer.flush()?;
        self.read_line()
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn input(
        &mut self,
        prompt: &str,
    ) -> Result<String, PromptError> {
        self.ask(prompt)
    }

    fn confirm(
        &mut self,
        prompt: &str,
        default: bool,
    ) -> Result<bool, PromptError> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            let answer = self.ask(&format!("{prompt} [{hint}]"))?;
            match answer.to_ascii_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.notify("Please enter 'yes' or 'no'."),
            }
        }
    }

    fn select(
        &mut self,
        prompt: &str,
        items: &[&str],
        default: usize,
    ) -> Result<usize, PromptError> {
        writeln!(self.writer, "{prompt}")?;
        for (index, item) in items.iter().enumerate() {
            writeln!(self.writer, "  {}. {item}", index + 1)?;
        }
        loop {
            let answer = self.ask(&format!("Enter your choice (1-{})", items.len()))?;
            if answer.is_empty() {
                return Ok(default);
            }
            if let Ok(number) = answer.parse::<usize>() {
                if (1..=items.len()).contains(&number) {
                    return Ok(number - 1);
                }
            }
            let lowered = answer.to_ascii_lowercase();
            if let Some(index) = items
                .iter()
                .position(|item| item.to_ascii_lowercase().starts_with(&lowered))
            {
                return Ok(index);
            }
            debug!(choice = %answer, "invalid menu choice");
            self.notify(&format!("Invalid choice. Please enter 1 to {}.", items.len()));
        }
    }

    fn notify(
        &mut self,
        message: &str,
    ) {
        let _ = writeln!(self.writer, "{message}");
    }
}

/// Choice offered by the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    NewCalculation,
    Exit,
}

pub fn prompt_menu(prompter: &mut dyn Prompter) -> Result<MenuChoice, PromptError> {
    let choice = prompter.select("Main menu", &["New calculation", "Exit"], 0)?;
    Ok(if choice == 0 {
        MenuChoice::NewCalculation
    } else {
        MenuChoice::Exit
    })
}

/// Asks for gross income until a valid amount is entered.
pub fn prompt_income(
    prompter: &mut dyn Prompter,
    max: Decimal,
) -> Result<Decimal, PromptError> {
    loop {
        let answer = prompter.input("Gross annual income excluding VAT (€)")?;
        match validate_amount("Gross income", &answer, max) {
            Ok(income) => {
                info!("Gross income collected");
                return Ok(income);
            }
            Err(err) => prompter.notify(&format!("Error: {err}")),
        }
    }
}

/// Asks for deductible expenses until a valid amount not above `income` is
/// entered.
pub fn prompt_expenses(
    prompter: &mut dyn Prompter,
    income: Decimal,
    max: Decimal,
) -> Result<Decimal, PromptError> {
    let prompt = format!("Deductible expenses, up to {} (€)", format_currency(income));
    loop {
        let answer = prompter.input(&prompt)?;
        let validated = validate_amount("Expenses", &answer, max)
            .and_then(|expenses| validate_expenses(expenses, income).map(|()| expenses));
        match validated {
            Ok(expenses) => {
                info!("Deductible expenses collected");
                return Ok(expenses);
            }
            Err(err) => prompter.notify(&format!("Error: {err}")),
        }
    }
}

pub fn prompt_frequency(prompter: &mut dyn Prompter) -> Result<PaymentFrequency, PromptError> {
    let labels: Vec<String> = PaymentFrequency::ALL
        .iter()
        .map(|frequency| {
            let count = frequency.installment_count();
            let noun = if count == 1 { "payment" } else { "payments" };
            format!("{} ({count} {noun} per year)", frequency.label())
        })
        .collect();
    let items: Vec<&str> = labels.iter().map(String::as_str).collect();

    let index = prompter.select("Payment frequency", &items, 1)?;
    let frequency = PaymentFrequency::ALL[index.min(PaymentFrequency::ALL.len() - 1)];
    info!(frequency = %frequency, "Payment frequency selected");
    Ok(frequency)
}

/// Shows the collected values and asks whether to go ahead.
pub fn confirm_inputs(
    prompter: &mut dyn Prompter,
    income: Decimal,
    expenses: Decimal,
    frequency: PaymentFrequency,
) -> Result<bool, PromptError> {
    prompter.notify(&format!(
        "\nGross annual income:  {}\nDeductible expenses:  {}\nPayment frequency:    {}",
        format_currency(income),
        format_currency(expenses),
        frequency.label()
    ));
    prompter.confirm("Proceed with calculation?", true)
}
