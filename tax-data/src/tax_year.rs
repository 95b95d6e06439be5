use std::fs;
use std::path::Path;

use tax_core::TaxYearTables;
use tracing::{debug, info};

use crate::{BracketCsvLoader, TablesLoaderError};

/// Loads [`TaxYearTables`] from TOML.
///
/// The TOML layout mirrors the serde shape of `TaxYearTables` field for
/// field. Decimal amounts should be quoted strings so they load exactly.
/// Every loaded table is validated before it is returned; the engine
/// itself never re-checks its inputs.
pub struct TaxYearLoader;

impl TaxYearLoader {
    /// Parses and validates tables from a TOML document.
    pub fn from_toml_str(input: &str) -> Result<TaxYearTables, TablesLoaderError> {
        let tables: TaxYearTables = toml::from_str(input)?;
        Self::validated(tables)
    }

    /// Reads, parses, and validates a TOML tables file.
    pub fn from_path(path: &Path) -> Result<TaxYearTables, TablesLoaderError> {
        let input = fs::read_to_string(path).map_err(|source| TablesLoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Read tax-year tables");

        Self::from_toml_str(&input)
    }

    /// Replaces the federal brackets of `tables` with a CSV schedule file
    /// and re-validates the result.
    pub fn with_brackets(
        mut tables: TaxYearTables,
        csv_path: &Path,
    ) -> Result<TaxYearTables, TablesLoaderError> {
        let file = fs::File::open(csv_path).map_err(|source| TablesLoaderError::Io {
            path: csv_path.to_path_buf(),
            source,
        })?;
        let records = BracketCsvLoader::parse(file)?;
        BracketCsvLoader::apply(&records, &mut tables)?;

        Self::validated(tables)
    }

    fn validated(tables: TaxYearTables) -> Result<TaxYearTables, TablesLoaderError> {
        tables
            .validate()
            .map_err(|source| TablesLoaderError::Invalid {
                tax_year: tables.tax_year,
                source,
            })?;
        info!(tax_year = tables.tax_year, "Loaded tax-year tables");
        Ok(tables)
    }
}
