//! `validate` command implementation.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use catalog_calculation::PluginRegistry;
use contracts::MeasurementBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    ap_corr_names: usize,
    ignored: usize,
    proxies: usize,
    plugins: Vec<String>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return invalid(config_path, format!("File not found: {}", args.config.display()));
    }

    let blueprint = match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => blueprint,
        Err(e) => return invalid(config_path, e.to_string()),
    };

    // Plugin names and overrides are only checked against the registry
    let resolved = match PluginRegistry::with_builtin_plugins()
        .and_then(|registry| registry.apply(&blueprint.catalog_calculation.plugins))
    {
        Ok(resolved) => resolved,
        Err(e) => return invalid(config_path, e.to_string()),
    };

    let warnings = collect_warnings(&blueprint);
    ValidationResult {
        valid: true,
        config_path,
        error: None,
        warnings: if warnings.is_empty() {
            None
        } else {
            Some(warnings)
        },
        summary: Some(ConfigSummary {
            version: format!("{:?}", blueprint.version),
            ap_corr_names: blueprint.ap_corr_names.len(),
            ignored: blueprint.apply_ap_corr.ignore_list.len(),
            proxies: blueprint.apply_ap_corr.proxies.len(),
            plugins: resolved.into_iter().map(|p| p.name).collect(),
        }),
    }
}

fn invalid(config_path: String, error: String) -> ValidationResult {
    ValidationResult {
        valid: false,
        config_path,
        error: Some(error),
        warnings: None,
        summary: None,
    }
}

/// Non-fatal issues that change what a run does
fn collect_warnings(blueprint: &MeasurementBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();
    let names: BTreeSet<&str> = blueprint.ap_corr_names.iter().map(String::as_str).collect();

    if names.is_empty() && blueprint.apply_ap_corr.proxies.is_empty() {
        warnings.push("No ap_corr_names or proxies - no fluxes will be corrected".to_string());
    }

    for name in &blueprint.apply_ap_corr.ignore_list {
        if !names.contains(name.as_str()) {
            warnings.push(format!(
                "apply_ap_corr.ignore_list entry '{}' is not in ap_corr_names",
                name
            ));
        }
    }

    for (name, model) in &blueprint.apply_ap_corr.proxies {
        if names.contains(name.as_str()) {
            warnings.push(format!(
                "Proxy '{}' is already in ap_corr_names and will use its own model",
                name
            ));
        }
        if !names.contains(model.as_str()) {
            warnings.push(format!(
                "Proxy '{}' uses model '{}' which is not in ap_corr_names",
                name, model
            ));
        }
    }

    if blueprint.catalog_calculation.plugins.is_empty() {
        warnings.push("No catalog calculation plugins selected".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Aperture correction names: {}", summary.ap_corr_names);
            println!("  Ignored: {}", summary.ignored);
            println!("  Proxies: {}", summary.proxies);
            println!("  Plugins: {}", summary.plugins.join(", "));
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
