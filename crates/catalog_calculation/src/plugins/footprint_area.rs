//! Footprint area in pixels

use contracts::{
    CatalogCalculationPlugin, ContractError, Key, MeasurementError, PluginError, Schema,
    SingleRecordPlugin, SourceRecord, DEFAULT_CATALOG_CALCULATION,
};
use serde::{Deserialize, Serialize};

use crate::registry::PluginDefinition;

/// No options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FootprintAreaConfig {}

/// Copies the record's footprint area into `<name>_value`
pub struct FootprintArea {
    name: String,
    key: Key<i32>,
}

impl PluginDefinition for FootprintArea {
    type Config = FootprintAreaConfig;
    const EXECUTION_ORDER: f64 = DEFAULT_CATALOG_CALCULATION;

    fn build(
        _config: FootprintAreaConfig,
        name: &str,
        schema: &mut Schema,
    ) -> Result<CatalogCalculationPlugin, ContractError> {
        let key = schema.add_field::<i32>(
            Schema::join(name, "value"),
            "Number of pixels in the source's detection footprint",
        )?;
        Ok(CatalogCalculationPlugin::single(Self {
            name: name.to_string(),
            key,
        }))
    }
}

impl SingleRecordPlugin for FootprintArea {
    fn name(&self) -> &str {
        &self.name
    }

    fn calculate(&mut self, record: &mut SourceRecord) -> Result<(), PluginError> {
        let area = record.footprint_area().ok_or_else(|| {
            PluginError::measurement(Schema::join(&self.name, "flag"), "record has no footprint")
        })?;
        let area = i32::try_from(area)
            .map_err(|_| PluginError::other(format!("footprint area {area} overflows")))?;
        record.set(self.key, area);
        Ok(())
    }

    /// No-op. The plugin adds no `<name>_flag` column, so a failed record
    /// keeps the initial 0 in `<name>_value` and is only counted.
    fn fail(&mut self, _record: &mut SourceRecord, _error: Option<&MeasurementError>) {}
}
