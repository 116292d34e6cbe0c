//! Plain-text rendering of a calculation.
//!
//! Everything here is pure: [`render_report`] turns a result and schedule
//! into the text that is both printed and saved.

use std::fmt::Write;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};
use tax_core::{BracketLine, IncomeTaxResult, PaymentSchedule, SocialSecurityResult, TaxResult, VatResult};

use crate::utils::{format_currency, format_percent};

const WIDTH: usize = 70;

#[derive(Debug, Clone, Tabled)]
struct BracketRow {
    #[tabled(rename = "Bracket")]
    range: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Taxable amount")]
    taxable: String,
    #[tabled(rename = "Tax")]
    tax: String,
}

impl From<&BracketLine> for BracketRow {
    fn from(line: &BracketLine) -> Self {
        let range = match line.upper_bound {
            Some(upper) => format!(
                "{} - {}",
                format_currency(line.lower_bound),
                format_currency(upper)
            ),
            None => format!("{}+", format_currency(line.lower_bound)),
        };
        Self {
            range,
            rate: format_percent(line.rate_percent),
            taxable: format_currency(line.taxable_amount),
            tax: format_currency(line.tax_amount),
        }
    }
}

#[derive(Debug, Clone, Tabled)]
struct InstallmentRow {
    #[tabled(rename = "Payment")]
    period: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

fn rule(ch: char) -> String {
    ch.to_string().repeat(WIDTH)
}

fn heading(
    out: &mut String,
    title: &str,
) {
    let _ = writeln!(out, "{}", rule('-'));
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", rule('-'));
}

fn row(
    out: &mut String,
    label: &str,
    value: &str,
) {
    let _ = writeln!(out, "{label:<35} {value:>34}");
}

fn right_aligned_table<T: Tabled>(rows: Vec<T>, first_numeric_column: usize) -> String {
    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(first_numeric_column..)).with(Alignment::right()))
        .to_string()
}

pub fn input_parameters(
    out: &mut String,
    result: &TaxResult,
    schedule: &PaymentSchedule,
) {
    heading(out, "INPUT PARAMETERS");
    row(out, "Gross Annual Income:", &format_currency(result.gross_income));
    row(
        out,
        "Deductible Business Expenses:",
        &format_currency(result.deductible_expenses),
    );
    row(out, "Payment Frequency:", schedule.frequency.label());
}

pub fn income_breakdown(
    out: &mut String,
    result: &TaxResult,
) {
    heading(out, "INCOME BREAKDOWN");
    row(out, "Gross Income:", &format_currency(result.gross_income));
    row(
        out,
        "Less: Deductible Expenses:",
        &format_currency(result.deductible_expenses),
    );
    row(out, "Taxable Income:", &format_currency(result.taxable_income));
}

pub fn income_tax_breakdown(
    out: &mut String,
    income_tax: &IncomeTaxResult,
) {
    heading(out, "INCOME TAX BREAKDOWN BY BRACKET");
    if income_tax.bracket_lines.is_empty() {
        let _ = writeln!(out, "  No income tax (taxable income is zero)");
    } else {
        let rows: Vec<BracketRow> = income_tax.bracket_lines.iter().map(BracketRow::from).collect();
        let _ = writeln!(out, "{}", right_aligned_table(rows, 1));
    }
    row(out, "Total Income Tax:", &format_currency(income_tax.total_tax));
    row(
        out,
        "Effective Income Tax Rate:",
        &format_percent(income_tax.effective_rate_percent),
    );
}

/// VAT and social security, with the social-security split and the rate
/// each figure was computed at.
pub fn vat_and_social_security(
    out: &mut String,
    vat: &VatResult,
    social_security: &SocialSecurityResult,
    social_rates: (Decimal, Decimal),
) {
    heading(out, "VAT AND SOCIAL SECURITY");
    row(
        out,
        &format!("VAT ({}):", format_percent(vat.rate_percent)),
        &format_currency(vat.vat_amount),
    );
    let _ = writeln!(out, "  (To be collected from clients)");
    let _ = writeln!(out);
    row(
        out,
        &format!("Social Security ({}):", format_percent(social_security.rate_percent)),
        &format_currency(social_security.total_contribution),
    );
    row(
        out,
        &format!("  Main Insurance ({}):", format_percent(social_rates.0)),
        &format_currency(social_security.main_insurance),
    );
    row(
        out,
        &format!("  Additional Contributions ({}):", format_percent(social_rates.1)),
        &format_currency(social_security.additional_contribution),
    );
}

pub fn payment_schedule(
    out: &mut String,
    schedule: &PaymentSchedule,
) {
    heading(
        out,
        &format!("PAYMENT SCHEDULE ({})", schedule.frequency.as_str().to_uppercase()),
    );
    row(
        out,
        "Total Annual Tax (excl. VAT):",
        &format_currency(schedule.annual_total),
    );
    row(
        out,
        "Number of Payments:",
        &schedule.installment_count.to_string(),
    );
    row(
        out,
        "Amount per Payment:",
        &format_currency(schedule.installment_amount),
    );

    if schedule.installment_count > 1 {
        let rows: Vec<InstallmentRow> = schedule
            .installments
            .iter()
            .map(|installment| InstallmentRow {
                period: format!("Payment #{}", installment.period_number),
                amount: format_currency(installment.amount),
            })
            .collect();
        let _ = writeln!(out, "{}", right_aligned_table(rows, 1));
        row(
            out,
            "Total of Payments:",
            &format_currency(schedule.scheduled_total()),
        );
    }
}

pub fn summary(
    out: &mut String,
    result: &TaxResult,
) {
    let _ = writeln!(out, "{}", rule('='));
    let _ = writeln!(out, "SUMMARY");
    let _ = writeln!(out, "{}", rule('='));
    row(out, "Gross Income:", &format_currency(result.gross_income));
    row(
        out,
        "Total Taxes (Income Tax + Social):",
        &format_currency(result.total_taxes),
    );
    row(
        out,
        "Effective Total Tax Rate:",
        &format_percent(result.effective_total_rate_percent),
    );
    row(out, "Net Income (After Taxes):", &format_currency(result.net_income));
    row(
        out,
        "Total Obligations (incl. VAT):",
        &format_currency(result.total_obligations),
    );
    let _ = writeln!(out, "{}", rule('='));
    let _ = writeln!(
        out,
        "Note: VAT of {} should be collected from clients",
        format_currency(result.vat.vat_amount)
    );
    let _ = writeln!(out, "      and remitted to tax authorities separately.");
    let _ = writeln!(out, "{}", rule('='));
}

/// Renders the full report.
///
/// `social_rates` are the configured main and additional social-security
/// rates as percentages, shown next to their amounts.
pub fn render_report(
    result: &TaxResult,
    schedule: &PaymentSchedule,
    social_rates: (Decimal, Decimal),
    generated_at: NaiveDateTime,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", rule('='));
    let _ = writeln!(out, "FREELANCER TAX CALCULATION RESULTS");
    let _ = writeln!(out, "{}", rule('='));
    let _ = writeln!(
        out,
        "Calculation Date: {}",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(out, "{}", rule('='));
    let _ = writeln!(out);

    input_parameters(&mut out, result, schedule);
    let _ = writeln!(out);
    income_breakdown(&mut out, result);
    let _ = writeln!(out);
    income_tax_breakdown(&mut out, &result.income_tax);
    let _ = writeln!(out);
    vat_and_social_security(&mut out, &result.vat, &result.social_security, social_rates);
    let _ = writeln!(out);
    payment_schedule(&mut out, schedule);
    let _ = writeln!(out);
    summary(&mut out, result);

    out
}
