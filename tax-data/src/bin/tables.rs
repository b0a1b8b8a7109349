use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tax_core::{FilingStatusCode, ScheduleKind, TaxTables};
use tax_data::{SUPPORTED_YEARS, TAX_BRACKETS_FILE, TaxTablesLoader, builtin_tables};

/// Validate tax tables and print a summary of each year.
///
/// A tables directory holds three CSV files:
/// - tax_brackets.csv: ordinary rate schedules (X, Y-1, Y-2, Z)
/// - capital_gains_rates.csv: 0/15/20% tiers, same columns
/// - standard_deductions.csv: tax_year, filing_status, amount, additional_age_amount
#[derive(Parser, Debug)]
#[command(name = "tax-tables")]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory containing the CSV files (defaults to the built-in tables)
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Only check this tax year
    #[arg(short, long)]
    year: Option<i32>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let years = match (args.year, &args.dir) {
        (Some(year), _) => vec![year],
        (None, None) => SUPPORTED_YEARS.to_vec(),
        (None, Some(dir)) => {
            let path = dir.join(TAX_BRACKETS_FILE);
            let file = File::open(&path)
                .with_context(|| format!("Failed to open: {}", path.display()))?;
            let records = TaxTablesLoader::parse_brackets(file)
                .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
            TaxTablesLoader::years(&records)
        }
    };

    for year in years {
        let tables = match &args.dir {
            Some(dir) => TaxTablesLoader::load_dir(dir, year)
                .with_context(|| format!("Invalid {year} tables in {}", dir.display()))?,
            None => builtin_tables(year)
                .with_context(|| format!("Invalid built-in {year} tables"))?,
        };
        print_summary(&tables)?;
    }

    Ok(())
}

fn print_summary(tables: &TaxTables) -> Result<()> {
    println!("Tax year {} (senior age {})", tables.tax_year, tables.senior_age);

    for status in FilingStatusCode::ALL {
        let ordinary = tables.schedule(ScheduleKind::Ordinary, status)?;
        let preferential = tables.schedule(ScheduleKind::Preferential, status)?;
        let deduction = tables.standard_deduction(status)?;
        let top = ordinary
            .last()
            .context("validated schedule has no brackets")?;

        println!(
            "  {:<4} {} brackets, top {}% from {}; {} gains tiers; standard deduction {} (+{} per senior)",
            status.as_str(),
            ordinary.len(),
            top.tax_rate * rust_decimal::Decimal::ONE_HUNDRED,
            top.min_income,
            preferential.len(),
            deduction.amount,
            deduction.additional_age_amount,
        );
    }

    Ok(())
}
