//! `info` command implementation.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use catalog_calculation::{PluginRegistry, ResolvedPlugin};
use contracts::MeasurementBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    ap_corr: ApCorrInfo,
    plugins: Vec<PluginInfo>,
    available_plugins: Vec<String>,
}

#[derive(Serialize)]
struct ApCorrInfo {
    names: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ignore_list: Vec<String>,
    do_flag_ap_corr_failures: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    proxies: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct PluginInfo {
    name: String,
    execution_order: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<serde_json::Value>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let registry = PluginRegistry::with_builtin_plugins()?;
    let resolved = registry
        .apply(&blueprint.catalog_calculation.plugins)
        .context("Failed to resolve catalog calculation plugins")?;

    let info = build_config_info(&blueprint, &registry, &resolved, args.plugins);
    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn build_config_info(
    blueprint: &MeasurementBlueprint,
    registry: &PluginRegistry,
    resolved: &[ResolvedPlugin],
    with_config: bool,
) -> ConfigInfo {
    let mut names = blueprint.ap_corr_names.clone();
    names.sort();

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        ap_corr: ApCorrInfo {
            names,
            ignore_list: blueprint.apply_ap_corr.ignore_list.clone(),
            do_flag_ap_corr_failures: blueprint.apply_ap_corr.do_flag_ap_corr_failures,
            proxies: blueprint.apply_ap_corr.proxies.clone(),
        },
        plugins: resolved
            .iter()
            .map(|plugin| PluginInfo {
                name: plugin.name.clone(),
                execution_order: plugin.execution_order,
                config: with_config.then(|| plugin.config.clone()),
            })
            .collect(),
        available_plugins: registry.names().map(str::to_string).collect(),
    }
}

fn print_config_info(info: &ConfigInfo) {
    println!("\n=== Measurement Configuration ===\n");
    println!("Version: {}", info.version);

    println!("\nAperture correction:");
    println!(
        "  Flag failures: {}",
        if info.ap_corr.do_flag_ap_corr_failures {
            "yes"
        } else {
            "no"
        }
    );
    println!("  Fields ({}):", info.ap_corr.names.len());
    for (i, name) in info.ap_corr.names.iter().enumerate() {
        let is_last = i == info.ap_corr.names.len() - 1 && info.ap_corr.proxies.is_empty();
        let prefix = if is_last { "└─" } else { "├─" };
        let ignored = if info.ap_corr.ignore_list.contains(name) {
            " (ignored)"
        } else {
            ""
        };
        println!("  {} {}{}", prefix, name, ignored);
    }
    for (i, (name, model)) in info.ap_corr.proxies.iter().enumerate() {
        let prefix = if i == info.ap_corr.proxies.len() - 1 {
            "└─"
        } else {
            "├─"
        };
        println!("  {} {} -> {} (proxy)", prefix, name, model);
    }

    println!("\nCatalog calculation plugins ({}):", info.plugins.len());
    for (i, plugin) in info.plugins.iter().enumerate() {
        let is_last = i == info.plugins.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        println!(
            "  {} {} [order {:.1}]",
            prefix, plugin.name, plugin.execution_order
        );
        if let Some(ref config) = plugin.config {
            let indent = if is_last { "     " } else { "  │  " };
            if let Some(options) = config.as_object() {
                for (key, value) in options {
                    println!("  {}{} = {}", indent, key, value);
                }
            }
        }
    }

    println!("\nRegistered plugins: {}", info.available_plugins.join(", "));
    println!();
}
