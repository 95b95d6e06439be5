//! Reading return snapshots from disk.
//!
//! The format is picked from the file extension:
//!
//! | Extension | Format |
//! |-----------|--------|
//! | `.json` | JSON |
//! | `.toml` | TOML |
//!
//! Both formats use the serde shape of [`TaxReturn`]. Every section of a
//! return defaults, so a partially completed walkthrough still loads.

use std::fs;
use std::path::{Path, PathBuf};

use tax_core::TaxReturn;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ReturnInputError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported return file extension for {0} (expected .json or .toml)")]
    UnsupportedFormat(PathBuf),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnFormat {
    Json,
    Toml,
}

impl ReturnFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

pub fn parse_return(
    input: &str,
    format: ReturnFormat,
) -> Result<TaxReturn, ReturnInputError> {
    let tax_return = match format {
        ReturnFormat::Json => serde_json::from_str(input)?,
        ReturnFormat::Toml => toml::from_str(input)?,
    };
    Ok(tax_return)
}

/// Loads a return snapshot, choosing the format by extension.
pub fn load_return(path: &Path) -> Result<TaxReturn, ReturnInputError> {
    let format = ReturnFormat::from_path(path)
        .ok_or_else(|| ReturnInputError::UnsupportedFormat(path.to_path_buf()))?;
    let input = fs::read_to_string(path).map_err(|source| ReturnInputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), ?format, "Read return snapshot");

    parse_return(&input, format)
}
