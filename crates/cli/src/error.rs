//! Error types for CLI operations.

use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{kind} file not found: {path}")]
    FileNotFound { kind: &'static str, path: String },

    #[error("Aperture corrections requested but no --ap-corr-map given")]
    MissingApCorrMap,

    #[error("Failed to load {what}: {source}")]
    Load {
        what: &'static str,
        #[source]
        source: contracts::ContractError,
    },

    #[error("Aperture correction setup failed: {0}")]
    ApCorr(#[from] ap_corr::ApCorrError),

    #[error("Catalog calculation failed: {0}")]
    CatalogCalculation(#[from] catalog_calculation::CatalogCalculationError),

    #[error("Failed to write output catalog: {0}")]
    Output(#[source] contracts::ContractError),
}

impl CliError {
    pub fn load(what: &'static str, source: contracts::ContractError) -> Self {
        Self::Load { what, source }
    }

    /// `FileNotFound` unless `path` exists
    pub fn require_file(kind: &'static str, path: &Path) -> Result<()> {
        if path.exists() {
            Ok(())
        } else {
            Err(Self::FileNotFound {
                kind,
                path: path.display().to_string(),
            })
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
