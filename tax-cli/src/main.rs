use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tax_core::{TaxBreakdown, TaxCalculator};
use tracing::debug;

use tax_cli::app::{self, OutputFormat};
use tax_cli::config::CliConfig;
use tax_cli::request::TaxRequest;
use tax_cli::{batch, logging};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Deterministic US federal income tax estimator.
///
/// Computes AGI, the standard deduction, taxable income, ordinary and capital
/// gains tax, and credits from a request file, a CSV batch, or an interactive
/// wizard.
#[derive(Debug, Parser)]
#[command(name = "tax-estimator", version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// TOML settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Tax year of the rate tables (default: latest built-in year).
    #[arg(long, global = true)]
    year: Option<i32>,

    /// Directory of rate-table CSVs to use instead of the built-in tables.
    #[arg(long, global = true)]
    tables_dir: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `tax_core=debug`. `RUST_LOG` wins.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also append logs to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

impl GlobalArgs {
    fn to_config(&self) -> CliConfig {
        CliConfig {
            tax_year: self.year,
            tables_dir: self.tables_dir.clone(),
            log_level: self.log_level.clone(),
            log_file: self.log_file.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Calculate the tax for a TOML or JSON request file.
    Calculate {
        request: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Enter a return step by step.
    Wizard,

    /// Check a JSON breakdown produced elsewhere.
    Audit {
        breakdown: PathBuf,

        /// Request the breakdown was produced for; enables a field-by-field
        /// comparison with the deterministic result.
        #[arg(long)]
        request: Option<PathBuf>,
    },

    /// Calculate every row of a scenario CSV.
    Batch { csv: PathBuf },

    /// List income, deduction and credit keys.
    Catalog,
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let file_config = match &cli.global.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    let config = cli.global.to_config().or(file_config);

    logging::init_logging(config.log_level())?;
    if let Some(path) = &config.log_file {
        logging::enable_file_logging(path)?;
    }
    debug!(?config, "configuration resolved");

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let code = match cli.command {
        Command::Catalog => {
            app::run_catalog(&mut out)?;
            ExitCode::SUCCESS
        }
        Command::Calculate { request, format } => {
            let request = TaxRequest::load(&request)?;
            let tables = app::load_tables(&config, request.tax_year)?;
            app::run_calculate(&TaxCalculator::new(&tables), &request, format, &mut out)?;
            ExitCode::SUCCESS
        }
        Command::Wizard => {
            let tables = app::load_tables(&config, None)?;
            let stdin = io::stdin();
            app::run_wizard(&TaxCalculator::new(&tables), stdin.lock(), &mut out)?;
            ExitCode::SUCCESS
        }
        Command::Audit { breakdown, request } => {
            let path = breakdown;
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to open: {}", path.display()))?;
            let breakdown: TaxBreakdown = serde_json::from_str(&contents)
                .with_context(|| format!("Invalid breakdown: {}", path.display()))?;
            let request = request.map(|path| TaxRequest::load(&path)).transpose()?;

            let year = request
                .as_ref()
                .and_then(|r| r.tax_year)
                .or(Some(breakdown.tax_year).filter(|y| *y != 0));
            let tables = app::load_tables(&config, year)?;
            let findings =
                app::run_audit(&TaxCalculator::new(&tables), &breakdown, request.as_ref(), &mut out)?;
            if findings == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            }
        }
        Command::Batch { csv } => {
            let rows = batch::load_from_file(&csv)?;
            let tables = app::load_tables(&config, None)?;
            let failures = app::run_batch(&TaxCalculator::new(&tables), &rows, &mut out)?;
            if failures == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            }
        }
    };

    out.flush()?;
    Ok(code)
}
