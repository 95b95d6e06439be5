use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tax_core::TaxYearTables;
use tax_data::TaxYearLoader;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Validate tax-year tables before handing them to the engine.
///
/// Loads a TOML tables file (or the built-in tables for `--year`),
/// optionally replaces its federal brackets with a CSV schedule file, and
/// runs every validation check. Exits non-zero on the first failure.
///
/// The bracket CSV file should have the following columns:
/// - tax_year: The tax year (e.g., 2025)
/// - schedule: The IRS schedule code (X, Y-1, Y-2, Z)
/// - min_income: The minimum income for this bracket
/// - max_income: The maximum income (empty for unlimited)
/// - base_tax: The base tax amount for this bracket
/// - rate: The marginal tax rate as a decimal (e.g., 0.10)
#[derive(Parser, Debug)]
#[command(name = "tax-data-check")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a TOML file with complete tax-year tables
    #[arg(short, long)]
    tables: Option<PathBuf>,

    /// Path to a CSV file with federal bracket schedules
    #[arg(short, long)]
    brackets: Option<PathBuf>,

    /// Tax year of the built-in tables, used when --tables is not given
    #[arg(short, long, default_value_t = 2025)]
    year: i32,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();
}

fn builtin(year: i32) -> Result<TaxYearTables> {
    match year {
        2025 => Ok(TaxYearTables::y2025()),
        other => bail!("No built-in tables for tax year {other}; pass --tables"),
    }
}

fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();

    let mut tables = match &args.tables {
        Some(path) => {
            println!("Loading tables from: {}", path.display());
            TaxYearLoader::from_path(path)
                .with_context(|| format!("Failed to load tables: {}", path.display()))?
        }
        None => builtin(args.year)?,
    };

    if let Some(path) = &args.brackets {
        println!("Loading brackets from: {}", path.display());
        tables = TaxYearLoader::with_brackets(tables, path)
            .with_context(|| format!("Failed to load brackets: {}", path.display()))?;
    } else {
        tables
            .validate()
            .with_context(|| format!("Tables for {} failed validation", tables.tax_year))?;
    }

    debug!(tax_year = tables.tax_year, "Tables validated");

    println!("Tax year {} tables are valid.", tables.tax_year);
    for (status, table) in tables.federal_brackets.iter() {
        println!(
            "  {:<28} {} brackets, standard deduction {}",
            status.label(),
            table.brackets().len(),
            tables.standard_deduction.get(status)
        );
    }
    println!("  {} state rules", tables.states.rules.len());

    Ok(())
}
