//! Loaders for tax-year tables kept outside the binary.
//!
//! Two formats are supported:
//!
//! | Format | Contents | Loader |
//! |--------|----------|--------|
//! | TOML | A complete [`TaxYearTables`](tax_core::TaxYearTables) | [`TaxYearLoader`] |
//! | CSV | Federal bracket schedules in IRS form (X, Y-1, Y-2, Z) | [`BracketCsvLoader`] |
//!
//! Both validate what they load; a table that fails validation is never
//! returned.

mod error;
mod loader;
mod tax_year;

pub use error::TablesLoaderError;
pub use loader::{BracketCsvLoader, BracketRecord, SCHEDULES};
pub use tax_year::TaxYearLoader;
