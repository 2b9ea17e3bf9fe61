//! # Config Loader
//!
//! Turns files on disk into the values a measurement run needs: the
//! `MeasurementBlueprint` (TOML or JSON, validated), the input catalog
//! document and the aperture correction map.
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("measurement.toml")).unwrap();
//! println!("{} flux fields", blueprint.ap_corr_names.len());
//! ```

mod documents;
mod parser;
mod validator;

pub use contracts::MeasurementBlueprint;
pub use documents::{ApCorrMapLoader, CatalogLoader};
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Entry point for measurement configuration files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Read, parse and validate a blueprint; `.toml` and `.json` are recognised
    pub fn load_from_path(path: &Path) -> Result<MeasurementBlueprint, ContractError> {
        let format = Self::detect_format(path)?;
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content, format)
    }

    /// Parse and validate an in-memory blueprint
    ///
    /// # Errors
    /// `ConfigParse` for malformed input, `ConfigValidation` when a
    /// validation rule rejects the result.
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<MeasurementBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }

    pub fn to_toml(blueprint: &MeasurementBlueprint) -> Result<String, ContractError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    pub fn to_json(blueprint: &MeasurementBlueprint) -> Result<String, ContractError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }

    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ContractError::config_parse("config path has no extension"))?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }
}
