//! Configuration validation
//!
//! Rules:
//! - declarative field rules (`validator` derive on the contract structs)
//! - plugin names unique within the plugin set
//! - ap-corr names non-empty and unique
//! - proxies never map a field onto itself or onto an empty name

use std::collections::HashSet;

use contracts::{ContractError, MeasurementBlueprint};
use ::validator::Validate;

/// Validate a MeasurementBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &MeasurementBlueprint) -> Result<(), ContractError> {
    validate_declared_rules(blueprint)?;
    validate_plugin_names(blueprint)?;
    validate_ap_corr_names(blueprint)?;
    validate_proxies(blueprint)?;
    Ok(())
}

/// Run the derive-generated rules
fn validate_declared_rules(blueprint: &MeasurementBlueprint) -> Result<(), ContractError> {
    blueprint
        .validate()
        .map_err(|e| ContractError::config_validation("blueprint", e.to_string()))
}

/// Plugin names must be unique
fn validate_plugin_names(blueprint: &MeasurementBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for plugin in &blueprint.catalog_calculation.plugins {
        if !seen.insert(plugin.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("catalog_calculation.plugins[name={}]", plugin.name),
                "duplicate plugin name",
            ));
        }
    }
    Ok(())
}

/// Flux algorithm names must be non-empty and unique
fn validate_ap_corr_names(blueprint: &MeasurementBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, name) in blueprint.ap_corr_names.iter().enumerate() {
        if name.is_empty() {
            return Err(ContractError::config_validation(
                format!("ap_corr_names[{idx}]"),
                "name cannot be empty",
            ));
        }
        if !seen.insert(name.as_str()) {
            return Err(ContractError::config_validation(
                format!("ap_corr_names[{idx}]"),
                format!("duplicate ap-corr name '{name}'"),
            ));
        }
    }
    Ok(())
}

/// Proxy mapping sanity
fn validate_proxies(blueprint: &MeasurementBlueprint) -> Result<(), ContractError> {
    for (name, model) in &blueprint.apply_ap_corr.proxies {
        if name.is_empty() || model.is_empty() {
            return Err(ContractError::config_validation(
                format!("apply_ap_corr.proxies[{name}]"),
                "proxy names cannot be empty",
            ));
        }
        if name == model {
            return Err(ContractError::config_validation(
                format!("apply_ap_corr.proxies[{name}]"),
                "a field cannot be its own proxy",
            ));
        }
    }
    Ok(())
}
