//! Pipeline orchestrator.
//!
//! Runs one measurement pass over a catalog document:
//! 1. Build the schema from the input document
//! 2. Construct the aperture correction and catalog calculation tasks
//! 3. Fill the catalog, correct fluxes, run catalog calculation
//! 4. Write the augmented catalog

use std::path::PathBuf;
use std::time::Instant;

use ap_corr::{ApCorrNameSet, ApplyApCorrTask, FluxErrMode};
use catalog_calculation::{CatalogCalculationTask, PluginRegistry};
use config_loader::{ApCorrMapLoader, CatalogLoader};
use contracts::{CatalogDocument, MeasurementBlueprint, SourceCatalog};
use tracing::{info, instrument, warn};

use super::stats::PipelineStats;
use crate::error::{CliError, Result};

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub catalog_path: PathBuf,
    pub ap_corr_map_path: Option<PathBuf>,
    pub output_path: PathBuf,
    pub skip_ap_corr: bool,
    pub skip_catalog_calculation: bool,
    pub flux_err_mode: FluxErrMode,
    /// Build the tasks and stop before touching any record
    pub dry_run: bool,
}

/// Pipeline orchestrator
pub struct Pipeline {
    blueprint: MeasurementBlueprint,
    config: PipelineConfig,
    registry: PluginRegistry,
}

impl Pipeline {
    pub fn new(blueprint: MeasurementBlueprint, config: PipelineConfig) -> Result<Self> {
        Ok(Self {
            blueprint,
            config,
            registry: PluginRegistry::with_builtin_plugins()?,
        })
    }

    /// Run the pipeline to completion
    #[instrument(
        name = "pipeline_run",
        skip(self),
        fields(catalog = %self.config.catalog_path.display())
    )]
    pub fn run(self) -> Result<PipelineStats> {
        let start = Instant::now();
        let mut stats = PipelineStats::default();

        CliError::require_file("Catalog", &self.config.catalog_path)?;
        let document = CatalogLoader::load_from_path(&self.config.catalog_path)
            .map_err(|e| CliError::load("catalog", e))?;
        let mut schema = document
            .build_schema()
            .map_err(|e| CliError::load("catalog schema", e))?;

        // Aperture correction runs at a lower execution order, so its
        // columns must exist before catalog calculation plugins look them up.
        let ap_corr = if self.config.skip_ap_corr {
            info!("Aperture correction skipped");
            None
        } else {
            let map_path = self
                .config
                .ap_corr_map_path
                .as_ref()
                .ok_or(CliError::MissingApCorrMap)?;
            CliError::require_file("Aperture correction map", map_path)?;
            let map = ApCorrMapLoader::load_from_path(map_path)
                .map_err(|e| CliError::load("aperture correction map", e))?;

            let names = ApCorrNameSet::from_names(&self.blueprint.ap_corr_names);
            let task = ApplyApCorrTask::new(
                &mut schema,
                &names,
                self.blueprint.apply_ap_corr.clone(),
            )?
            .with_flux_err_mode(self.config.flux_err_mode);
            Some((task, map))
        };

        let mut calculation = if self.config.skip_catalog_calculation {
            info!("Catalog calculation skipped");
            None
        } else {
            Some(CatalogCalculationTask::new(
                &mut schema,
                &self.registry,
                &self.blueprint.catalog_calculation,
            )?)
        };

        if self.config.dry_run {
            info!(
                ap_corr_fields = ap_corr.as_ref().map_or(0, |(task, _)| task.infos().len()),
                plugins = ?calculation.as_ref().map(|task| task.plugin_names().to_vec()),
                "Dry run: tasks constructed, no records processed"
            );
            stats.duration = start.elapsed();
            return Ok(stats);
        }

        let mut catalog = document
            .fill(SourceCatalog::new(schema))
            .map_err(|e| CliError::load("catalog records", e))?;
        stats.records = catalog.len();
        info!(records = stats.records, "Catalog loaded");

        if let Some((task, map)) = &ap_corr {
            for field in task.run(&mut catalog, map) {
                if field.model_missing {
                    stats.missing_models.push(field.name.clone());
                }
                stats
                    .metrics
                    .absorb_ap_corr(&field.name, field.corrected, field.failed, &field.applied);
                stats.ap_corr_fields += 1;
            }
        }

        if let Some(task) = calculation.as_mut() {
            let summary = task.run(&mut catalog)?;
            for (plugin, counts) in &summary.plugins {
                stats.metrics.absorb_plugin(plugin, counts);
            }
            stats.buckets = summary.buckets;
        }

        if !stats.missing_models.is_empty() {
            warn!(
                fields = ?stats.missing_models,
                "Aperture correction models missing from map"
            );
        }

        let output = CatalogDocument::from_catalog(&catalog).map_err(CliError::Output)?;
        CatalogLoader::write_to_path(&output, &self.config.output_path)
            .map_err(CliError::Output)?;
        info!(output = %self.config.output_path.display(), "Catalog written");

        stats.duration = start.elapsed();
        Ok(stats)
    }
}
