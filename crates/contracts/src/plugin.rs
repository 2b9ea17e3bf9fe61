//! Catalog calculation plugin capability
//!
//! A plugin is either record-scoped or catalog-scoped. The two scopes are
//! distinct traits wrapped in [`CatalogCalculationPlugin`], so the driver never
//! inspects a mode string at run time.

use serde::{Deserialize, Serialize};

use crate::{MeasurementError, PluginError, SourceCatalog, SourceRecord};

/// Centroid algorithms run first
pub const CENTROID_ORDER: f64 = 0.0;
/// Shape algorithms
pub const SHAPE_ORDER: f64 = 1.0;
/// Flux algorithms
pub const FLUX_ORDER: f64 = 2.0;
/// Aperture correction
pub const APCORR_ORDER: f64 = 3.0;
/// Minimum execution order for catalog calculation plugins
pub const DEFAULT_CATALOG_CALCULATION: f64 = 4.0;

/// Dispatch scope of a plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlugType {
    /// One record per call
    Single,
    /// The whole catalog per call
    Multi,
}

/// Plugin operating on one record at a time
pub trait SingleRecordPlugin {
    /// Name the plugin was registered with
    fn name(&self) -> &str;

    /// Compute and write results into `record`
    fn calculate(&mut self, record: &mut SourceRecord) -> Result<(), PluginError>;

    /// Record a failure on `record`
    ///
    /// Only called for measurement errors. The scheduler always passes
    /// `Some`; `None` is left for callers flagging a record without a
    /// classified cause.
    fn fail(&mut self, record: &mut SourceRecord, error: Option<&MeasurementError>);
}

/// Plugin operating on the whole catalog
pub trait CatalogPlugin {
    /// Name the plugin was registered with
    fn name(&self) -> &str;

    /// Compute and write results into `catalog`
    fn calculate(&mut self, catalog: &mut SourceCatalog) -> Result<(), PluginError>;

    /// Record a failure on `catalog`; see [`SingleRecordPlugin::fail`]
    fn fail(&mut self, catalog: &mut SourceCatalog, error: Option<&MeasurementError>);
}

/// Constructed plugin instance
pub enum CatalogCalculationPlugin {
    Single(Box<dyn SingleRecordPlugin>),
    Multi(Box<dyn CatalogPlugin>),
}

impl CatalogCalculationPlugin {
    pub fn single(plugin: impl SingleRecordPlugin + 'static) -> Self {
        Self::Single(Box::new(plugin))
    }

    pub fn multi(plugin: impl CatalogPlugin + 'static) -> Self {
        Self::Multi(Box::new(plugin))
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Single(plugin) => plugin.name(),
            Self::Multi(plugin) => plugin.name(),
        }
    }

    pub fn plug_type(&self) -> PlugType {
        match self {
            Self::Single(_) => PlugType::Single,
            Self::Multi(_) => PlugType::Multi,
        }
    }
}

impl std::fmt::Debug for CatalogCalculationPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogCalculationPlugin")
            .field("name", &self.name())
            .field("plug_type", &self.plug_type())
            .finish()
    }
}
