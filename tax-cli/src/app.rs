//! The subcommands of `tax-estimator`, written against plain readers and
//! writers so they can be driven from tests.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tax_core::{
    CreditKind, DeductionGroup, DeductionKind, IncomeGroup, IncomeSource, Refundability,
    TaxBreakdown, TaxCalculator, TaxTables, audit_breakdown, compare_breakdowns,
};
use tax_data::{LATEST_YEAR, TaxTablesLoader, builtin_tables};
use tracing::{debug, info, warn};

use crate::batch::BatchRow;
use crate::config::CliConfig;
use crate::presenter::{CalculationState, format_currency, summary_line};
use crate::request::TaxRequest;
use crate::wizard::{Wizard, WizardEvent, WizardStep};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report.
    #[default]
    Text,
    /// The breakdown as camelCase JSON.
    Json,
}

/// Loads the tables for `tax_year`, or the configured year, or the latest
/// built-in year. A configured `tables_dir` replaces the built-in tables.
pub fn load_tables(
    config: &CliConfig,
    tax_year: Option<i32>,
) -> Result<TaxTables> {
    let year = tax_year.or(config.tax_year).unwrap_or(LATEST_YEAR);

    let tables = match &config.tables_dir {
        Some(dir) => {
            info!(year, dir = %dir.display(), "loading tax tables");
            TaxTablesLoader::load_dir(dir, year)
                .with_context(|| format!("Invalid {year} tables in {}", dir.display()))?
        }
        None => {
            debug!(year, "using built-in tax tables");
            builtin_tables(year).with_context(|| format!("No built-in tables for {year}"))?
        }
    };
    Ok(tables)
}

pub fn run_calculate<W: Write>(
    calculator: &TaxCalculator<'_>,
    request: &TaxRequest,
    format: OutputFormat,
    out: &mut W,
) -> Result<TaxBreakdown> {
    let breakdown = calculator
        .compute(&request.to_input())
        .context("Calculation failed")?;

    match format {
        OutputFormat::Text => {
            write!(out, "{}", CalculationState::Computed(breakdown.clone()))?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &breakdown)?;
            writeln!(out)?;
        }
    }
    Ok(breakdown)
}

/// Checks an externally produced breakdown. With a request, it is also
/// compared field by field against the deterministic result.
///
/// Returns the number of findings.
pub fn run_audit<W: Write>(
    calculator: &TaxCalculator<'_>,
    breakdown: &TaxBreakdown,
    request: Option<&TaxRequest>,
    out: &mut W,
) -> Result<usize> {
    let mut findings = audit_breakdown(breakdown);

    if let Some(request) = request {
        let expected = calculator
            .compute(&request.to_input())
            .context("Calculation failed")?;
        findings.extend(compare_breakdowns(&expected, breakdown));
    }

    if findings.is_empty() {
        writeln!(out, "OK: no findings")?;
    } else {
        warn!(count = findings.len(), "breakdown failed audit");
        for finding in &findings {
            writeln!(out, "FINDING: {finding}")?;
        }
    }
    Ok(findings.len())
}

/// Computes every row and prints one line each. A failing row does not stop
/// the batch.
///
/// Returns the number of rows that failed.
pub fn run_batch<W: Write>(
    calculator: &TaxCalculator<'_>,
    rows: &[BatchRow],
    out: &mut W,
) -> Result<usize> {
    let mut failures = 0;
    for row in rows {
        match calculator.compute(&row.input) {
            Ok(breakdown) => writeln!(out, "{}: {}", row.display_name(), summary_line(&breakdown))?,
            Err(e) => {
                failures += 1;
                warn!(row = row.row, error = %e, "batch row failed");
                writeln!(out, "{}: error: {e}", row.display_name())?;
            }
        }
    }
    info!(rows = rows.len(), failures, "batch complete");
    Ok(failures)
}

/// Lists every catalog key by section.
pub fn run_catalog<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "Income")?;
    for group in [
        IncomeGroup::Earned,
        IncomeGroup::Investment,
        IncomeGroup::RetirementAndGovernment,
        IncomeGroup::PassiveAndMiscellaneous,
    ] {
        writeln!(out, "  {}", group.title())?;
        for source in IncomeSource::ALL.iter().filter(|s| s.group() == group) {
            writeln!(
                out,
                "    {:<40}{:<30}{}",
                source.key(),
                source.label(),
                source.tax_character()
            )?;
        }
    }

    writeln!(out, "Deductions")?;
    for group in [
        DeductionGroup::Common,
        DeductionGroup::SelfEmployedAndBusiness,
        DeductionGroup::Other,
    ] {
        writeln!(out, "  {}", group.title())?;
        for kind in DeductionKind::ALL.iter().filter(|k| k.group() == group) {
            writeln!(out, "    {:<40}{}", kind.key(), kind.label())?;
        }
    }

    writeln!(out, "Credits")?;
    for (title, refundability) in [
        ("Refundable", Refundability::Refundable),
        ("Nonrefundable", Refundability::Nonrefundable),
    ] {
        writeln!(out, "  {title}")?;
        for kind in CreditKind::ALL.iter().filter(|k| k.refundability() == refundability) {
            writeln!(out, "    {:<40}{}", kind.key(), kind.label())?;
        }
    }
    Ok(())
}

// ─── interactive wizard ──────────────────────────────────────────────────────

const WIZARD_HELP: &str = "\
Commands:
  set <field> <value>   set a field on this step (empty value clears it)
  show                  show the fields on this step
  next | back           move between steps
  goto <step>           jump to a step already reached (name or 1-5)
  calc                  calculate and show the results
  results               show the latest results
  reset                 start over
  help                  show this message
  quit                  leave the wizard";

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Set { field: &'a str, value: &'a str },
    Event(WizardEvent),
    Show,
    Results,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<Command<'_>>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match word.to_ascii_lowercase().as_str() {
        "set" => {
            let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            if field.is_empty() {
                return Err("usage: set <field> <value>".to_string());
            }
            Command::Set {
                field,
                value: value.trim(),
            }
        }
        "next" | "n" => Command::Event(WizardEvent::Next),
        "back" | "previous" | "b" => Command::Event(WizardEvent::Previous),
        "goto" | "go" => {
            let step = WizardStep::parse(rest).ok_or_else(|| format!("unknown step '{rest}'"))?;
            Command::Event(WizardEvent::NavigateTo(step))
        }
        "calc" | "calculate" => Command::Event(WizardEvent::Calculate),
        "reset" => Command::Event(WizardEvent::Reset),
        "show" => Command::Show,
        "results" => Command::Results,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command '{other}' (try 'help')")),
    };
    Ok(Some(command))
}

fn show_step<W: Write>(
    wizard: &Wizard,
    out: &mut W,
) -> Result<()> {
    let form = wizard.form();
    match wizard.step() {
        WizardStep::Situation => {
            writeln!(out, "  {:<40}{}", "filingStatus", form.filing_status.label())?;
            writeln!(out, "  {:<40}{}", "age", form.age)?;
            if form.filing_status.requires_spouse_age() {
                writeln!(out, "  {:<40}{}", "spouseAge", form.spouse_age)?;
            }
        }
        WizardStep::Income => {
            for source in IncomeSource::ALL {
                let value = form.income.get(&source).map_or("", String::as_str);
                writeln!(out, "  {:<40}{}", source.key(), value)?;
            }
            writeln!(out, "  {:<40}{}", "Total", format_currency(form.income_total()))?;
        }
        WizardStep::Deductions => {
            for kind in DeductionKind::ALL {
                let value = form.deductions.get(&kind).map_or("", String::as_str);
                writeln!(out, "  {:<40}{}", kind.key(), value)?;
            }
        }
        WizardStep::Credits => {
            for kind in CreditKind::ALL {
                let value = form.credits.get(&kind).map_or("", String::as_str);
                writeln!(out, "  {:<40}{}", kind.key(), value)?;
            }
        }
        WizardStep::Results => write!(out, "{}", wizard.state())?,
    }
    Ok(())
}

fn prompt<W: Write>(
    wizard: &Wizard,
    out: &mut W,
) -> Result<()> {
    let step = wizard.step();
    let position = WizardStep::ALL.iter().position(|s| *s == step).unwrap_or(0) + 1;
    write!(out, "[{position}/{}] {step}> ", WizardStep::ALL.len())?;
    out.flush()?;
    Ok(())
}

/// Runs the wizard until `quit` or end of input.
pub fn run_wizard<R: BufRead, W: Write>(
    calculator: &TaxCalculator<'_>,
    input: R,
    out: &mut W,
) -> Result<Wizard> {
    let mut wizard = Wizard::new();
    writeln!(out, "Federal tax estimate wizard. Type 'help' for commands.")?;
    prompt(&wizard, out)?;

    for line in input.lines() {
        let line = line.context("Failed to read input")?;
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => {
                prompt(&wizard, out)?;
                continue;
            }
            Err(message) => {
                writeln!(out, "error: {message}")?;
                prompt(&wizard, out)?;
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => writeln!(out, "{WIZARD_HELP}")?,
            Command::Show => show_step(&wizard, out)?,
            Command::Results => write!(out, "{}", wizard.state())?,
            Command::Set { field, value } => {
                if let Err(e) = wizard.set_field(field, value) {
                    writeln!(out, "error: {e}")?;
                }
            }
            Command::Event(event) => match wizard.handle(event, calculator) {
                Ok(()) if event == WizardEvent::Calculate => write!(out, "{}", wizard.state())?,
                Ok(()) => show_step(&wizard, out)?,
                Err(e) => writeln!(out, "error: {e}")?,
            },
        }
        prompt(&wizard, out)?;
    }

    writeln!(out)?;
    Ok(wizard)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_set_keeps_rest_of_line() {
        assert_eq!(
            parse_command("set wages  $50,000 ").unwrap(),
            Some(Command::Set {
                field: "wages",
                value: "$50,000",
            })
        );
        assert_eq!(
            parse_command("set age").unwrap(),
            Some(Command::Set {
                field: "age",
                value: "",
            })
        );
    }

    #[test]
    fn parse_navigation() {
        assert_eq!(parse_command("NEXT").unwrap(), Some(Command::Event(WizardEvent::Next)));
        assert_eq!(
            parse_command("goto credits").unwrap(),
            Some(Command::Event(WizardEvent::NavigateTo(WizardStep::Credits)))
        );
        assert!(parse_command("goto nowhere").is_err());
    }

    #[test]
    fn parse_blank_and_unknown() {
        assert_eq!(parse_command("   ").unwrap(), None);
        assert!(parse_command("dance").is_err());
        assert!(parse_command("set").is_err());
    }

    #[test]
    fn load_tables_defaults_to_latest_year() {
        let tables = load_tables(&CliConfig::default(), None).unwrap();

        assert_eq!(tables.tax_year, LATEST_YEAR);
    }

    #[test]
    fn load_tables_prefers_explicit_year_over_config() {
        let config = CliConfig {
            tax_year: Some(2025),
            ..CliConfig::default()
        };

        assert_eq!(load_tables(&config, Some(2024)).unwrap().tax_year, 2024);
        assert!(load_tables(&config, Some(1999)).is_err());
    }

    #[test]
    fn catalog_lists_every_key() {
        let mut out = Vec::new();
        run_catalog(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        for source in IncomeSource::ALL {
            assert!(text.contains(source.key()), "missing {}", source.key());
        }
        for kind in DeductionKind::ALL {
            assert!(text.contains(kind.key()), "missing {}", kind.key());
        }
        for kind in CreditKind::ALL {
            assert!(text.contains(kind.key()), "missing {}", kind.key());
        }
    }
}
