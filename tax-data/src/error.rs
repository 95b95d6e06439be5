use std::path::PathBuf;

use rust_decimal::Decimal;
use tax_core::TablesError;
use thiserror::Error;

/// Errors that can occur when loading tax-year tables.
#[derive(Debug, Error)]
pub enum TablesLoaderError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Schedule {schedule} has no brackets for tax year {tax_year}")]
    MissingSchedule { schedule: String, tax_year: i32 },

    #[error(
        "Schedule {schedule}: bracket ending at {max_income} is followed by one starting at {next_min}"
    )]
    GapInSchedule {
        schedule: String,
        max_income: String,
        next_min: Decimal,
    },

    #[error("Schedule {schedule}: top bracket must have no max income, found {max_income}")]
    BoundedTopBracket { schedule: String, max_income: Decimal },

    #[error(
        "Schedule {schedule}: base tax at {min_income} is {found}, brackets below it add up to {expected}"
    )]
    BaseTaxMismatch {
        schedule: String,
        min_income: Decimal,
        expected: Decimal,
        found: Decimal,
    },

    #[error("Tables for {tax_year} failed validation: {source}")]
    Invalid {
        tax_year: i32,
        #[source]
        source: TablesError,
    },
}

impl From<csv::Error> for TablesLoaderError {
    fn from(err: csv::Error) -> Self {
        TablesLoaderError::CsvParse(err.to_string())
    }
}
