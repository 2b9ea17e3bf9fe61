//! Plugin registry
//!
//! Maps a plugin name to its definition: execution order, typed configuration
//! and constructor. The registry is an ordinary value owned by the caller and
//! passed to [`crate::CatalogCalculationTask::new`]; nothing is global.

use std::collections::BTreeMap;

use contracts::{CatalogCalculationPlugin, ContractError, PluginSelection, Schema};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{CatalogCalculationError, Result};

/// Static description of a plugin type
pub trait PluginDefinition: 'static {
    /// Typed options; `#[serde(default, deny_unknown_fields)]` is expected so
    /// that partial overrides work and misspelled options are rejected
    type Config: DeserializeOwned + Serialize + Default;

    /// Bucket the plugin runs in; lower runs first
    const EXECUTION_ORDER: f64;

    /// Construct an instance, adding the plugin's output fields to `schema`
    fn build(
        config: Self::Config,
        name: &str,
        schema: &mut Schema,
    ) -> std::result::Result<CatalogCalculationPlugin, ContractError>;
}

type ResolveFn = fn(&str, &serde_json::Value) -> Result<serde_json::Value>;
type BuildFn = fn(&str, &serde_json::Value, &mut Schema) -> Result<CatalogCalculationPlugin>;

#[derive(Clone, Copy)]
struct RegistryEntry {
    execution_order: f64,
    resolve: ResolveFn,
    build: BuildFn,
}

/// Name -> plugin definition
#[derive(Default)]
pub struct PluginRegistry {
    entries: BTreeMap<String, RegistryEntry>,
}

impl PluginRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in plugins
    pub fn with_builtin_plugins() -> Result<Self> {
        let mut registry = Self::new();
        crate::plugins::register_builtin_plugins(&mut registry)?;
        Ok(registry)
    }

    /// Register `P` under `name`
    ///
    /// # Errors
    /// `DuplicateRegistration` if `name` is taken.
    pub fn register<P: PluginDefinition>(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(CatalogCalculationError::DuplicateRegistration { name });
        }

        debug!(plugin = %name, execution_order = P::EXECUTION_ORDER, "plugin registered");
        self.entries.insert(
            name,
            RegistryEntry {
                execution_order: P::EXECUTION_ORDER,
                resolve: resolve_config::<P>,
                build: build_plugin::<P>,
            },
        );
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Declared execution order of a registered plugin
    pub fn execution_order(&self, name: &str) -> Option<f64> {
        self.entries.get(name).map(|e| e.execution_order)
    }

    /// Default configuration of a registered plugin, as JSON
    pub fn default_config(&self, name: &str) -> Result<serde_json::Value> {
        let entry = self.entry(name)?;
        (entry.resolve)(name, &serde_json::Value::Null)
    }

    /// Declarative plugin set enabling `defaults` with no overrides
    ///
    /// # Errors
    /// `UnknownPlugin` for any name that is not registered.
    pub fn make_field(&self, defaults: &[&str]) -> Result<Vec<PluginSelection>> {
        defaults
            .iter()
            .map(|name| {
                self.entry(name)?;
                Ok(PluginSelection::new(*name))
            })
            .collect()
    }

    /// Resolve a plugin set into configured plugins sorted by execution order
    ///
    /// The sort is stable, so plugins sharing an order keep their selection order.
    pub fn apply(&self, selections: &[PluginSelection]) -> Result<Vec<ResolvedPlugin>> {
        let mut resolved = selections
            .iter()
            .map(|selection| {
                let entry = self.entry(&selection.name)?;
                let config = (entry.resolve)(&selection.name, &selection.config)?;
                Ok(ResolvedPlugin {
                    execution_order: entry.execution_order,
                    name: selection.name.clone(),
                    config,
                    build: entry.build,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        resolved.sort_by(|a, b| a.execution_order.total_cmp(&b.execution_order));
        Ok(resolved)
    }

    fn entry(&self, name: &str) -> Result<&RegistryEntry> {
        self.entries
            .get(name)
            .ok_or_else(|| CatalogCalculationError::unknown_plugin(name))
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(n, e)| (n, e.execution_order)))
            .finish()
    }
}

/// One enabled plugin, configured but not yet constructed
#[derive(Clone)]
pub struct ResolvedPlugin {
    pub execution_order: f64,
    pub name: String,
    /// Complete configuration (defaults plus overrides)
    pub config: serde_json::Value,
    build: BuildFn,
}

impl ResolvedPlugin {
    /// Construct the plugin against `schema`
    pub fn construct(&self, schema: &mut Schema) -> Result<CatalogCalculationPlugin> {
        (self.build)(&self.name, &self.config, schema)
    }
}

impl std::fmt::Debug for ResolvedPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedPlugin")
            .field("execution_order", &self.execution_order)
            .field("name", &self.name)
            .field("config", &self.config)
            .finish()
    }
}

fn parse_config<P: PluginDefinition>(name: &str, value: &serde_json::Value) -> Result<P::Config> {
    if value.is_null() {
        return Ok(P::Config::default());
    }
    serde_json::from_value(value.clone())
        .map_err(|e| CatalogCalculationError::plugin_config(name, e.to_string()))
}

fn resolve_config<P: PluginDefinition>(
    name: &str,
    overrides: &serde_json::Value,
) -> Result<serde_json::Value> {
    let config = parse_config::<P>(name, overrides)?;
    serde_json::to_value(&config)
        .map_err(|e| CatalogCalculationError::plugin_config(name, e.to_string()))
}

fn build_plugin<P: PluginDefinition>(
    name: &str,
    config: &serde_json::Value,
    schema: &mut Schema,
) -> Result<CatalogCalculationPlugin> {
    let config = parse_config::<P>(name, config)?;
    Ok(P::build(config, name, schema)?)
}
