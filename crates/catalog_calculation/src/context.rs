//! Guarded plugin invocation
//!
//! Every `calculate` call goes through [`invoke_guarded`], which classifies the
//! outcome:
//! - fatal errors abort the run
//! - measurement errors are handed to the plugin's `fail`
//! - anything else is logged and skipped
//!
//! Nothing is rolled back; plugins default their flags to failed before
//! computing, so a partial write is safe.

use contracts::{
    CatalogPlugin, MeasurementError, PluginError, SingleRecordPlugin, SourceCatalog, SourceRecord,
};
use observability::metrics::{self, FailureKind};
use tracing::{debug, error, warn};

use crate::error::{CatalogCalculationError, Result};
use crate::scheduler::RunSummary;

/// A plugin viewed through the operations the guard needs
pub(crate) trait Guarded<T: ?Sized> {
    fn plugin_name(&self) -> &str;
    fn calculate(&mut self, target: &mut T) -> std::result::Result<(), PluginError>;
    fn fail(&mut self, target: &mut T, error: Option<&MeasurementError>);
}

impl Guarded<SourceRecord> for dyn SingleRecordPlugin {
    fn plugin_name(&self) -> &str {
        self.name()
    }

    fn calculate(&mut self, target: &mut SourceRecord) -> std::result::Result<(), PluginError> {
        SingleRecordPlugin::calculate(self, target)
    }

    fn fail(&mut self, target: &mut SourceRecord, error: Option<&MeasurementError>) {
        SingleRecordPlugin::fail(self, target, error)
    }
}

impl Guarded<SourceCatalog> for dyn CatalogPlugin {
    fn plugin_name(&self) -> &str {
        self.name()
    }

    fn calculate(&mut self, target: &mut SourceCatalog) -> std::result::Result<(), PluginError> {
        CatalogPlugin::calculate(self, target)
    }

    fn fail(&mut self, target: &mut SourceCatalog, error: Option<&MeasurementError>) {
        CatalogPlugin::fail(self, target, error)
    }
}

/// Run one `calculate` call under the failure isolation policy
///
/// # Errors
/// `Fatal` when the plugin reports an out-of-memory or fatal algorithm error.
pub(crate) fn invoke_guarded<P, T>(
    plugin: &mut P,
    target: &mut T,
    summary: &mut RunSummary,
) -> Result<()>
where
    P: Guarded<T> + ?Sized,
    T: ?Sized,
{
    summary.record_invocation(plugin.plugin_name());
    metrics::record_plugin_invocation(plugin.plugin_name());

    match plugin.calculate(target) {
        Ok(()) => Ok(()),
        Err(err) if err.is_fatal() => {
            let name = plugin.plugin_name().to_string();
            error!(plugin = %name, error = %err, "fatal error in catalog calculation plugin");
            metrics::record_plugin_failure(&name, FailureKind::Fatal);
            Err(CatalogCalculationError::Fatal {
                plugin: name,
                source: err,
            })
        }
        Err(PluginError::Measurement(err)) => {
            debug!(plugin = %plugin.plugin_name(), flag = %err.flag, "{}", err.message);
            plugin.fail(target, Some(&err));
            summary.record_failure(plugin.plugin_name(), FailureKind::Measurement);
            metrics::record_plugin_failure(plugin.plugin_name(), FailureKind::Measurement);
            Ok(())
        }
        Err(err) => {
            warn!("Error in {}.calculate: {}", plugin.plugin_name(), err);
            summary.record_failure(plugin.plugin_name(), FailureKind::Other);
            metrics::record_plugin_failure(plugin.plugin_name(), FailureKind::Other);
            Ok(())
        }
    }
}
