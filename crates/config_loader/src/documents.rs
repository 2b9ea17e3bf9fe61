//! Catalog and aperture correction map documents (JSON)

use std::path::Path;

use contracts::{ApCorrMap, ApCorrMapDocument, CatalogDocument, ContractError};

/// Catalog document reader/writer
pub struct CatalogLoader;

impl CatalogLoader {
    /// Read a catalog document from a JSON file
    pub fn load_from_path(path: &Path) -> Result<CatalogDocument, ContractError> {
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content)
    }

    /// Parse a catalog document
    pub fn load_from_str(content: &str) -> Result<CatalogDocument, ContractError> {
        serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
            message: format!("catalog parse error: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Write a catalog document as pretty JSON
    pub fn write_to_path(document: &CatalogDocument, path: &Path) -> Result<(), ContractError> {
        let json = serde_json::to_string_pretty(document)
            .map_err(|e| ContractError::config_parse(format!("catalog serialize error: {e}")))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Aperture correction map reader
pub struct ApCorrMapLoader;

impl ApCorrMapLoader {
    /// Read an aperture correction map from a JSON file
    pub fn load_from_path(path: &Path) -> Result<ApCorrMap, ContractError> {
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content)
    }

    /// Parse an aperture correction map
    pub fn load_from_str(content: &str) -> Result<ApCorrMap, ContractError> {
        let document: ApCorrMapDocument =
            serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
                message: format!("ap-corr map parse error: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(ApCorrMap::from(document))
    }
}
