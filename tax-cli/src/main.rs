use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tax_cli::{Summary, load_return};
use tax_core::{TaxYearTables, resolve_return};
use tax_data::TaxYearLoader;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Compute a federal and state return from a saved walkthrough snapshot.
///
/// Uses the built-in tables for the return's tax year unless `--tables`
/// points at a TOML tables file. `--brackets` replaces the federal bracket
/// schedules with an IRS-schedule CSV file.
#[derive(Debug, Parser)]
#[command(name = "tax-cli")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Return snapshot to compute (`.json` or `.toml`).
    #[arg(short, long = "return", value_name = "FILE")]
    return_file: PathBuf,

    /// TOML file with complete tax-year tables.
    #[arg(short, long)]
    tables: Option<PathBuf>,

    /// CSV file with federal bracket schedules.
    #[arg(short, long)]
    brackets: Option<PathBuf>,

    /// Print the full result as JSON instead of the summary.
    #[arg(long, default_value_t = false)]
    json: bool,
}

// ─── tracing ─────────────────────────────────────────────────────────────────

/// Initialise the tracing subscriber.
///
/// * Honours `RUST_LOG` when set.
/// * Falls back to `info` so normal runs are quiet.
/// * Strips timestamps and target names to keep CLI output clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

// ─── tables ──────────────────────────────────────────────────────────────────

fn load_tables(
    cli: &Cli,
    tax_year: i32,
) -> Result<TaxYearTables> {
    let tables = match &cli.tables {
        Some(path) => TaxYearLoader::from_path(path)
            .with_context(|| format!("Failed to load tables: {}", path.display()))?,
        None => match tax_year {
            2025 => TaxYearTables::y2025(),
            other => bail!("No built-in tables for tax year {other}; pass --tables"),
        },
    };

    match &cli.brackets {
        Some(path) => TaxYearLoader::with_brackets(tables, path)
            .with_context(|| format!("Failed to load brackets: {}", path.display())),
        None => Ok(tables),
    }
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let tax_return = load_return(&cli.return_file)
        .with_context(|| format!("Failed to load return: {}", cli.return_file.display()))?;
    debug!(tax_year = tax_return.tax_year, "loaded return snapshot");

    for issue in tax_return.completeness_issues() {
        info!(?issue, "return is incomplete");
    }

    let tables = load_tables(&cli, tax_return.tax_year)?;
    let result = resolve_return(&tax_return, &tables);

    if cli.json {
        let json =
            serde_json::to_string_pretty(&result).context("Failed to serialize result")?;
        println!("{json}");
    } else {
        print!("{}", Summary::new(&result));
    }

    Ok(())
}
