//! `run` command implementation.

use anyhow::{Context, Result};
use ap_corr::FluxErrMode;
use tracing::info;

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    info!(
        ap_corr_names = blueprint.ap_corr_names.len(),
        proxies = blueprint.apply_ap_corr.proxies.len(),
        plugins = blueprint.catalog_calculation.plugins.len(),
        "Configuration loaded"
    );

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let pipeline_config = PipelineConfig {
        catalog_path: args.catalog.clone(),
        ap_corr_map_path: args.ap_corr_map.clone(),
        output_path: args.output.clone(),
        skip_ap_corr: args.skip_ap_corr,
        skip_catalog_calculation: args.skip_catalog_calculation,
        flux_err_mode: if args.full_flux_err {
            FluxErrMode::Full
        } else {
            ap_corr::DEFAULT_FLUX_ERR_MODE
        },
        dry_run: args.dry_run,
    };

    let stats = Pipeline::new(blueprint, pipeline_config)?
        .run()
        .context("Pipeline execution failed")?;

    if args.dry_run {
        info!("Dry run complete, configuration applies to the input catalog");
        return Ok(());
    }

    info!(
        records = stats.records,
        ap_corr_fields = stats.ap_corr_fields,
        duration_secs = stats.duration.as_secs_f64(),
        "Pipeline completed successfully"
    );
    stats.print_summary();

    Ok(())
}
