//! Per-field aperture correction bookkeeping

use contracts::{Key, Schema};

use crate::error::Result;

/// Keys and names for one corrected flux field
///
/// Reads `<name>_instFlux`, `<name>_instFluxErr` and `<name>_flag`. Writes
/// `<name>_apCorr` and `<name>_apCorrErr` unless they alias the columns of the
/// model field, and always adds its own `<name>_flag_apCorr`.
#[derive(Debug, Clone)]
pub struct ApCorrInfo {
    pub name: String,
    /// Map entry holding the correction model, `<model>_instFlux`
    pub model_name: String,
    /// Map entry holding the correction error model, `<model>_instFluxErr`
    pub model_sigma_name: String,
    /// False when the output columns are aliases of another field's
    pub do_ap_corr_column: bool,
    pub inst_flux_key: Key<f64>,
    pub inst_flux_err_key: Key<f64>,
    pub flux_flag_key: Key<bool>,
    pub ap_corr_key: Key<f64>,
    pub ap_corr_err_key: Key<f64>,
    pub ap_corr_flag_key: Key<bool>,
}

impl ApCorrInfo {
    /// Field corrected by its own model
    pub fn direct(schema: &mut Schema, name: &str) -> Result<Self> {
        Self::new(schema, name, name)
    }

    /// Field `name` corrected by the model of `model`
    pub fn new(schema: &mut Schema, model: &str, name: &str) -> Result<Self> {
        let inst_flux_key = schema.find(&Schema::join(name, "instFlux"))?;
        let inst_flux_err_key = schema.find(&Schema::join(name, "instFluxErr"))?;
        let flux_flag_key = schema.find(&Schema::join(name, "flag"))?;

        let ap_corr_name = Schema::join(name, "apCorr");
        let ap_corr_err_name = Schema::join(name, "apCorrErr");
        let model_ap_corr_name = Schema::join(model, "apCorr");

        let do_ap_corr_column = name == model || !schema.contains(&model_ap_corr_name);
        let (ap_corr_key, ap_corr_err_key) = if do_ap_corr_column {
            (
                schema.add_field::<f64>(
                    &ap_corr_name,
                    format!("aperture correction applied to {name}"),
                )?,
                schema.add_field::<f64>(
                    &ap_corr_err_name,
                    format!("standard deviation of aperture correction applied to {name}"),
                )?,
            )
        } else {
            let aliases = schema.alias_map_mut();
            aliases.set(&ap_corr_name, model_ap_corr_name);
            aliases.set(&ap_corr_err_name, Schema::join(model, "apCorrErr"));
            (
                schema.find(&ap_corr_name)?,
                schema.find(&ap_corr_err_name)?,
            )
        };

        let ap_corr_flag_key = schema.add_field::<bool>(
            Schema::join(name, "flag_apCorr"),
            format!("set if unable to aperture correct {name}"),
        )?;

        Ok(Self {
            name: name.to_string(),
            model_name: Schema::join(model, "instFlux"),
            model_sigma_name: Schema::join(model, "instFluxErr"),
            do_ap_corr_column,
            inst_flux_key,
            inst_flux_err_key,
            flux_flag_key,
            ap_corr_key,
            ap_corr_err_key,
            ap_corr_flag_key,
        })
    }

    pub fn is_proxy(&self) -> bool {
        !self.do_ap_corr_column
    }
}
