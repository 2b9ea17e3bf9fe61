//! MeasurementBlueprint - Config Loader output
//!
//! Describes one post-measurement run: which flux fields are aperture corrected
//! and how, and which catalog calculation plugins run with which overrides.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete measurement configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MeasurementBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Flux algorithm prefixes eligible for aperture correction
    #[serde(default = "default_ap_corr_names")]
    pub ap_corr_names: Vec<String>,

    /// Aperture correction settings
    #[serde(default)]
    #[validate(nested)]
    pub apply_ap_corr: ApplyApCorrConfig,

    /// Catalog calculation plugin set
    #[serde(default)]
    #[validate(nested)]
    pub catalog_calculation: CatalogCalculationConfig,
}

impl Default for MeasurementBlueprint {
    fn default() -> Self {
        Self {
            version: ConfigVersion::V1,
            ap_corr_names: default_ap_corr_names(),
            apply_ap_corr: ApplyApCorrConfig::default(),
            catalog_calculation: CatalogCalculationConfig::default(),
        }
    }
}

fn default_ap_corr_names() -> Vec<String> {
    vec!["base_PsfFlux".to_string(), "base_GaussianFlux".to_string()]
}

/// Aperture correction configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ApplyApCorrConfig {
    /// Flux algorithms in the name set to skip; unknown names only warn
    #[serde(default)]
    pub ignore_list: Vec<String>,

    /// Set the general failure flag of a flux when it cannot be corrected
    #[serde(default = "default_true")]
    pub do_flag_ap_corr_failures: bool,

    /// alg1 -> alg2: correct alg1 using the model of alg2
    #[serde(default)]
    pub proxies: BTreeMap<String, String>,
}

impl Default for ApplyApCorrConfig {
    fn default() -> Self {
        Self {
            ignore_list: Vec::new(),
            do_flag_ap_corr_failures: true,
            proxies: BTreeMap::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Catalog calculation driver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CatalogCalculationConfig {
    /// Plugins to run, with per-plugin overrides
    #[serde(default = "default_plugins")]
    #[validate(nested)]
    pub plugins: Vec<PluginSelection>,
}

impl Default for CatalogCalculationConfig {
    fn default() -> Self {
        Self {
            plugins: default_plugins(),
        }
    }
}

/// Built-in plugins enabled when nothing is configured
pub const DEFAULT_CATALOG_CALCULATION_PLUGINS: [&str; 2] =
    ["base_ClassificationExtendedness", "base_FootprintArea"];

fn default_plugins() -> Vec<PluginSelection> {
    DEFAULT_CATALOG_CALCULATION_PLUGINS
        .iter()
        .map(|name| PluginSelection::new(*name))
        .collect()
}

/// One enabled plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PluginSelection {
    /// Registered plugin name
    #[validate(length(min = 1, message = "plugin name cannot be empty"))]
    pub name: String,

    /// Overrides applied on top of the plugin's default config
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub config: serde_json::Value,
}

impl PluginSelection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: serde_json::Value::Null,
        }
    }

    pub fn with_config(name: impl Into<String>, config: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }
}
