//! # Catalog Calculation
//!
//! Plugin registry and execution scheduler for catalog calculation plugins.
//!
//! Responsibilities:
//! - Map plugin names to definitions (execution order, typed config, constructor)
//! - Resolve a declarative plugin set into ordered, configured plugins
//! - Run plugins bucket by bucket, isolating per-invocation failures
//!
//! # Example
//!
//! ```ignore
//! let registry = PluginRegistry::with_builtin_plugins()?;
//! let mut task = CatalogCalculationTask::new(&mut schema, &registry, &config)?;
//! let mut catalog = SourceCatalog::new(schema);
//! let summary = task.run(&mut catalog)?;
//! ```

mod context;
pub mod error;
pub mod plugins;
pub mod registry;
pub mod scheduler;

pub use contracts::{CatalogCalculationConfig, PluginSelection, DEFAULT_CATALOG_CALCULATION};
pub use error::{CatalogCalculationError, Result};
pub use registry::{PluginDefinition, PluginRegistry, ResolvedPlugin};
pub use scheduler::{CatalogCalculationTask, RunSummary};
