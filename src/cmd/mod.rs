pub mod curve;
pub mod report;
pub mod schema;
pub mod summary;
pub mod validate;

use crate::core::{TaxConfig, TaxYear};
use anyhow::Context;
use std::path::Path;

/// Load the rate document at `path`, or the bundled rates when no path is given
pub fn load_config(path: Option<&Path>) -> anyhow::Result<TaxConfig> {
    match path {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("reading rate document {}", path.display()))?;
            TaxConfig::from_slice(&bytes)
                .with_context(|| format!("loading rate document {}", path.display()))
        }
        None => Ok(TaxConfig::bundled()?),
    }
}

/// Requested year, or the most recent year of the rate document
pub fn resolve_year(config: &TaxConfig, year: Option<u16>) -> TaxYear {
    year.map(TaxYear).unwrap_or_else(|| config.latest_year())
}

/// Label of the rate document source for report headers
pub fn source_label(path: Option<&Path>) -> String {
    path.map_or("bundled rates".to_string(), |p| p.display().to_string())
}
