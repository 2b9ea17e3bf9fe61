//! Catalog calculation driver
//!
//! Plugins are grouped into buckets by execution order. Buckets run in
//! ascending order; within a bucket every catalog-scoped plugin runs once,
//! then every record-scoped plugin runs once per record.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use contracts::{
    CatalogCalculationConfig, CatalogCalculationPlugin, CatalogPlugin, Schema, SingleRecordPlugin,
    SourceCatalog, DEFAULT_CATALOG_CALCULATION,
};
use observability::metrics::{FailureKind, PluginCounts};
use tracing::{debug, info, instrument};

use crate::context::invoke_guarded;
use crate::error::{CatalogCalculationError, Result};
use crate::registry::{PluginRegistry, ResolvedPlugin};

/// Execution order with a total ordering, usable as a map key
#[derive(Debug, Clone, Copy)]
struct ExecutionOrder(f64);

impl PartialEq for ExecutionOrder {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ExecutionOrder {}

impl PartialOrd for ExecutionOrder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExecutionOrder {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Plugins sharing one execution order
#[derive(Default)]
struct Bucket {
    multi: Vec<Box<dyn CatalogPlugin>>,
    single: Vec<Box<dyn SingleRecordPlugin>>,
}

/// Outcome of one [`CatalogCalculationTask::run`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Guarded `calculate` calls
    pub invocations: u64,
    pub measurement_failures: u64,
    /// Unclassified failures that were logged and skipped
    pub other_failures: u64,
    pub buckets: usize,
    /// Per-plugin breakdown
    pub plugins: BTreeMap<String, PluginCounts>,
}

impl RunSummary {
    pub(crate) fn record_invocation(&mut self, plugin: &str) {
        self.invocations += 1;
        self.counts(plugin).invocations += 1;
    }

    pub(crate) fn record_failure(&mut self, plugin: &str, kind: FailureKind) {
        match kind {
            FailureKind::Measurement => {
                self.measurement_failures += 1;
                self.counts(plugin).measurement_failures += 1;
            }
            FailureKind::Other | FailureKind::Fatal => {
                self.other_failures += 1;
                self.counts(plugin).other_failures += 1;
            }
        }
    }

    fn counts(&mut self, plugin: &str) -> &mut PluginCounts {
        self.plugins.entry(plugin.to_string()).or_default()
    }
}

/// Runs catalog calculation plugins over a catalog
pub struct CatalogCalculationTask {
    buckets: BTreeMap<ExecutionOrder, Bucket>,
    plugin_names: Vec<String>,
}

impl CatalogCalculationTask {
    /// Resolve `config` against `registry` and construct every plugin
    ///
    /// All execution orders are checked before any plugin is constructed, so a
    /// rejected configuration leaves `schema` untouched.
    ///
    /// # Errors
    /// - `UnknownPlugin` / `PluginConfig` from resolution
    /// - `ExecutionOrderTooLow` for any plugin below [`DEFAULT_CATALOG_CALCULATION`]
    /// - `Contract` if a plugin cannot add or find its fields
    #[instrument(
        name = "catalog_calculation_task_new",
        skip(schema, registry, config),
        fields(plugin_count = config.plugins.len())
    )]
    pub fn new(
        schema: &mut Schema,
        registry: &PluginRegistry,
        config: &CatalogCalculationConfig,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        for selection in &config.plugins {
            if !seen.insert(selection.name.as_str()) {
                return Err(CatalogCalculationError::plugin_config(
                    &selection.name,
                    "plugin selected more than once",
                ));
            }
        }

        let resolved = registry.apply(&config.plugins)?;
        Self::from_resolved(schema, &resolved)
    }

    /// Construct from an already resolved plugin set
    ///
    /// The execution order check runs before anything is constructed, so an
    /// order error leaves `schema` untouched. A `construct` failure does not:
    /// fields added by the plugins built before it stay in `schema`.
    pub fn from_resolved(schema: &mut Schema, resolved: &[ResolvedPlugin]) -> Result<Self> {
        for plugin in resolved {
            if plugin.execution_order < DEFAULT_CATALOG_CALCULATION {
                return Err(CatalogCalculationError::ExecutionOrderTooLow {
                    plugin: plugin.name.clone(),
                    order: plugin.execution_order,
                    minimum: DEFAULT_CATALOG_CALCULATION,
                });
            }
        }

        let mut buckets: BTreeMap<ExecutionOrder, Bucket> = BTreeMap::new();
        let mut plugin_names = Vec::with_capacity(resolved.len());

        for plugin in resolved {
            let bucket = buckets
                .entry(ExecutionOrder(plugin.execution_order))
                .or_default();
            match plugin.construct(schema)? {
                CatalogCalculationPlugin::Single(p) => bucket.single.push(p),
                CatalogCalculationPlugin::Multi(p) => bucket.multi.push(p),
            }
            debug!(
                plugin = %plugin.name,
                execution_order = plugin.execution_order,
                "plugin initialized"
            );
            plugin_names.push(plugin.name.clone());
        }

        info!(
            plugins = plugin_names.len(),
            buckets = buckets.len(),
            "catalog calculation task initialized"
        );

        Ok(Self {
            buckets,
            plugin_names,
        })
    }

    /// Plugin names in execution order
    pub fn plugin_names(&self) -> &[String] {
        &self.plugin_names
    }

    /// Execution orders of the non-empty buckets, ascending
    pub fn execution_orders(&self) -> Vec<f64> {
        self.buckets.keys().map(|k| k.0).collect()
    }

    /// Run every plugin over `catalog`
    ///
    /// # Errors
    /// `Fatal` as soon as a plugin reports a fatal error; nothing after it runs.
    #[instrument(
        name = "catalog_calculation_run",
        skip(self, catalog),
        fields(records = catalog.len(), buckets = self.buckets.len())
    )]
    pub fn run(&mut self, catalog: &mut SourceCatalog) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for (order, bucket) in self.buckets.iter_mut() {
            debug!(execution_order = order.0, "running bucket");

            for plugin in bucket.multi.iter_mut() {
                invoke_guarded(plugin.as_mut(), catalog, &mut summary)?;
            }

            if !bucket.single.is_empty() {
                for record in catalog.iter_mut() {
                    for plugin in bucket.single.iter_mut() {
                        invoke_guarded(plugin.as_mut(), record, &mut summary)?;
                    }
                }
            }

            summary.buckets += 1;
        }

        info!(
            invocations = summary.invocations,
            measurement_failures = summary.measurement_failures,
            other_failures = summary.other_failures,
            "catalog calculation finished"
        );
        Ok(summary)
    }

    /// Alias of [`CatalogCalculationTask::run`]
    pub fn call_compute(&mut self, catalog: &mut SourceCatalog) -> Result<RunSummary> {
        self.run(catalog)
    }
}

impl std::fmt::Debug for CatalogCalculationTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogCalculationTask")
            .field("plugins", &self.plugin_names)
            .field("buckets", &self.execution_orders())
            .finish()
    }
}
