//! Star/galaxy separation from the ratio of a model flux to the PSF flux

use contracts::{
    CatalogCalculationPlugin, ContractError, Key, MeasurementError, PluginError, Schema,
    SingleRecordPlugin, SourceRecord, DEFAULT_CATALOG_CALCULATION,
};
use serde::{Deserialize, Serialize};

use crate::registry::PluginDefinition;

/// Options for [`ClassificationExtendedness`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassificationExtendednessConfig {
    /// Critical ratio of model to PSF flux
    pub flux_ratio: f64,
    /// Correction factor for the model flux error
    pub model_err_factor: f64,
    /// Correction factor for the PSF flux error
    pub psf_err_factor: f64,
    /// Flux algorithm prefix used as the PSF flux
    pub psf_flux: String,
    /// Flux algorithm prefix used as the model flux
    pub model_flux: String,
}

impl Default for ClassificationExtendednessConfig {
    fn default() -> Self {
        Self {
            flux_ratio: 0.925,
            model_err_factor: 0.0,
            psf_err_factor: 0.0,
            psf_flux: "base_PsfFlux".to_string(),
            model_flux: "base_GaussianFlux".to_string(),
        }
    }
}

struct FluxKeys {
    inst_flux: Key<f64>,
    inst_flux_err: Key<f64>,
    flag: Key<bool>,
}

impl FluxKeys {
    fn find(schema: &Schema, prefix: &str) -> Result<Self, ContractError> {
        Ok(Self {
            inst_flux: schema.find(&Schema::join(prefix, "instFlux"))?,
            inst_flux_err: schema.find(&Schema::join(prefix, "instFluxErr"))?,
            flag: schema.find(&Schema::join(prefix, "flag"))?,
        })
    }

    fn read(&self, record: &SourceRecord) -> (f64, f64, bool) {
        (
            record.get(self.inst_flux),
            record.get(self.inst_flux_err),
            record.get(self.flag),
        )
    }
}

/// Writes 0.0 (point source) or 1.0 (extended) into `<name>_value`
pub struct ClassificationExtendedness {
    name: String,
    config: ClassificationExtendednessConfig,
    value: Key<f64>,
    flag: Key<bool>,
    flag_name: String,
    psf: FluxKeys,
    model: FluxKeys,
}

impl PluginDefinition for ClassificationExtendedness {
    type Config = ClassificationExtendednessConfig;
    const EXECUTION_ORDER: f64 = DEFAULT_CATALOG_CALCULATION;

    fn build(
        config: ClassificationExtendednessConfig,
        name: &str,
        schema: &mut Schema,
    ) -> Result<CatalogCalculationPlugin, ContractError> {
        let psf = FluxKeys::find(schema, &config.psf_flux)?;
        let model = FluxKeys::find(schema, &config.model_flux)?;

        let value = schema.add_field::<f64>(
            Schema::join(name, "value"),
            "Set to 1 for extended sources, 0 for point sources",
        )?;
        let flag_name = Schema::join(name, "flag");
        let flag = schema.add_field::<bool>(&flag_name, "Set to 1 for any fatal failure")?;

        Ok(CatalogCalculationPlugin::single(Self {
            name: name.to_string(),
            config,
            value,
            flag,
            flag_name,
            psf,
            model,
        }))
    }
}

impl SingleRecordPlugin for ClassificationExtendedness {
    fn name(&self) -> &str {
        &self.name
    }

    fn calculate(&mut self, record: &mut SourceRecord) -> Result<(), PluginError> {
        let (model_flux, model_err, model_flag) = self.model.read(record);
        let (psf_flux, psf_err, psf_flag) = self.psf.read(record);

        // Error terms only contribute when their factor is non-zero
        let mut flux1 = self.config.flux_ratio * model_flux;
        if self.config.model_err_factor != 0.0 {
            flux1 += self.config.model_err_factor * model_err;
        }
        let mut flux2 = psf_flux;
        if self.config.psf_err_factor != 0.0 {
            flux2 += self.config.psf_err_factor * psf_err;
        }

        if flux1.is_nan() || flux2.is_nan() {
            return Err(PluginError::measurement(&self.flag_name, "flux is NaN"));
        }
        if model_flag || psf_flag {
            return Err(PluginError::measurement(&self.flag_name, "input flux flag set"));
        }

        let value = if flux1 < flux2 { 0.0 } else { 1.0 };
        record.set(self.value, value);
        Ok(())
    }

    fn fail(&mut self, record: &mut SourceRecord, _error: Option<&MeasurementError>) {
        record.set(self.flag, true);
    }
}
