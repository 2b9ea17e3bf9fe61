//! Catalog calculation error types

use contracts::{ContractError, PluginError};
use thiserror::Error;

/// Catalog calculation specific error
#[derive(Debug, Error)]
pub enum CatalogCalculationError {
    /// Name not present in the registry
    #[error("unknown catalog calculation plugin '{name}'")]
    UnknownPlugin { name: String },

    /// Name registered twice
    #[error("plugin '{name}' is already registered")]
    DuplicateRegistration { name: String },

    /// Plugin would run before the catalog calculation stage
    #[error(
        "plugin '{plugin}' has execution order {order}, catalog calculation requires at least {minimum}"
    )]
    ExecutionOrderTooLow {
        plugin: String,
        order: f64,
        minimum: f64,
    },

    /// Overrides do not fit the plugin's config
    #[error("invalid config for plugin '{plugin}': {message}")]
    PluginConfig { plugin: String, message: String },

    /// Fatal plugin failure; aborts the run
    #[error("fatal error in plugin '{plugin}': {source}")]
    Fatal {
        plugin: String,
        #[source]
        source: PluginError,
    },

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl CatalogCalculationError {
    /// Create plugin config error
    pub fn plugin_config(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PluginConfig {
            plugin: plugin.into(),
            message: message.into(),
        }
    }

    /// Create unknown plugin error
    pub fn unknown_plugin(name: impl Into<String>) -> Self {
        Self::UnknownPlugin { name: name.into() }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, CatalogCalculationError>;
