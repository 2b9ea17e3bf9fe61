//! Aperture correction task

use contracts::{ApCorrMap, ApplyApCorrConfig, Schema, SourceCatalog};
use observability::metrics;
use observability::RunningStats;
use tracing::{debug, info, instrument, warn, Level};

use crate::error::Result;
use crate::info::ApCorrInfo;
use crate::name_set::ApCorrNameSet;

/// How the corrected flux error is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FluxErrMode {
    /// `fluxErr * apCorr`
    Naive,
    /// Quadrature sum of the relative flux and correction errors. Double
    /// counts photon noise; for comparison runs only.
    Full,
}

/// Mode used by [`ApplyApCorrTask::new`]
pub const DEFAULT_FLUX_ERR_MODE: FluxErrMode = FluxErrMode::Naive;

/// Per-field outcome of [`ApplyApCorrTask::run`]
#[derive(Debug, Clone, Default)]
pub struct ApCorrFieldSummary {
    pub name: String,
    pub corrected: u64,
    pub failed: u64,
    /// The map had no value or no error model for this field
    pub model_missing: bool,
    /// Corrections applied to the corrected sources
    pub applied: RunningStats,
}

/// Applies aperture corrections to every configured flux field
#[derive(Debug)]
pub struct ApplyApCorrTask {
    infos: Vec<ApCorrInfo>,
    do_flag_ap_corr_failures: bool,
    flux_err_mode: FluxErrMode,
}

impl ApplyApCorrTask {
    /// Decide which fields are corrected and add their columns to `schema`
    ///
    /// Direct fields come first in sorted order, then proxies in sorted order.
    /// Fields whose `<name>_instFlux` is absent from the schema are skipped.
    ///
    /// # Errors
    /// `Contract` if a corrected field lacks its `instFluxErr` or `flag` column.
    #[instrument(
        name = "apply_ap_corr_task_new",
        skip(schema, names, config),
        fields(names = names.len(), proxies = config.proxies.len())
    )]
    pub fn new(
        schema: &mut Schema,
        names: &ApCorrNameSet,
        config: ApplyApCorrConfig,
    ) -> Result<Self> {
        let ignored: Vec<&str> = config
            .ignore_list
            .iter()
            .map(String::as_str)
            .collect();

        let mut missing: Vec<&str> = ignored
            .iter()
            .copied()
            .filter(|name| !names.contains(name))
            .collect();
        if !missing.is_empty() {
            missing.sort_unstable();
            missing.dedup();
            warn!(
                names = ?missing,
                "Fields in ignore_list that are not in the ap-corr name set"
            );
        }

        let mut infos = Vec::new();
        for name in names.iter() {
            if ignored.contains(&name) || !schema.contains(&Schema::join(name, "instFlux")) {
                continue;
            }
            infos.push(ApCorrInfo::direct(schema, name)?);
        }

        for (name, model) in &config.proxies {
            if names.contains(name) || !schema.contains(&Schema::join(name, "instFlux")) {
                continue;
            }
            infos.push(ApCorrInfo::new(schema, model, name)?);
        }

        debug!(
            names = ?infos.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
            "aperture correction fields"
        );

        Ok(Self {
            infos,
            do_flag_ap_corr_failures: config.do_flag_ap_corr_failures,
            flux_err_mode: DEFAULT_FLUX_ERR_MODE,
        })
    }

    /// Override the flux error policy
    pub fn with_flux_err_mode(mut self, mode: FluxErrMode) -> Self {
        self.flux_err_mode = mode;
        self
    }

    pub fn flux_err_mode(&self) -> FluxErrMode {
        self.flux_err_mode
    }

    /// Fields that will be corrected, in processing order
    pub fn infos(&self) -> &[ApCorrInfo] {
        &self.infos
    }

    /// Apply the corrections in `ap_corr_map` to `catalog` in place
    ///
    /// Not idempotent: a second run multiplies the fluxes again.
    #[instrument(
        name = "apply_ap_corr_run",
        skip(self, catalog, ap_corr_map),
        fields(records = catalog.len(), flux_fields = self.infos.len())
    )]
    pub fn run(
        &self,
        catalog: &mut SourceCatalog,
        ap_corr_map: &ApCorrMap,
    ) -> Vec<ApCorrFieldSummary> {
        info!(
            "Applying aperture corrections to {} instFlux fields",
            self.infos.len()
        );
        match self.flux_err_mode {
            FluxErrMode::Naive => debug!("Use naive instFlux sigma computation"),
            FluxErrMode::Full => debug!(
                "Use complex instFlux sigma computation that double-counts photon noise \
                 and thus over-estimates instFlux uncertainty"
            ),
        }

        self.infos
            .iter()
            .map(|info| self.apply_field(info, catalog, ap_corr_map))
            .collect()
    }

    fn apply_field(
        &self,
        info: &ApCorrInfo,
        catalog: &mut SourceCatalog,
        ap_corr_map: &ApCorrMap,
    ) -> ApCorrFieldSummary {
        let mut summary = ApCorrFieldSummary {
            name: info.name.clone(),
            ..Default::default()
        };

        let (model, err_model) = match (
            ap_corr_map.get(&info.model_name),
            ap_corr_map.get(&info.model_sigma_name),
        ) {
            (Some(model), Some(err_model)) => (model, err_model),
            (model, err_model) => {
                let missing: Vec<&str> = [
                    (model.is_none(), info.model_name.as_str()),
                    (err_model.is_none(), info.model_sigma_name.as_str()),
                ]
                .into_iter()
                .filter_map(|(absent, name)| absent.then_some(name))
                .collect();
                warn!(
                    "Cannot aperture correct {} because could not find {} in apCorrMap",
                    info.name,
                    missing.join(" or ")
                );
                for record in catalog.iter_mut() {
                    record.set(info.ap_corr_flag_key, true);
                    metrics::record_ap_corr_source(&info.name, false);
                }
                summary.model_missing = true;
                summary.failed = catalog.len() as u64;
                return summary;
            }
        };

        for record in catalog.iter_mut() {
            let center = record.centroid();
            record.set(info.ap_corr_flag_key, true);
            let mut old_flux_flag = false;
            if self.do_flag_ap_corr_failures {
                old_flux_flag = record.get(info.flux_flag_key);
                record.set(info.flux_flag_key, true);
            }

            let evaluated = model.evaluate(center).and_then(|ap_corr| {
                let ap_corr_err = match self.flux_err_mode {
                    FluxErrMode::Naive => 0.0,
                    FluxErrMode::Full => err_model.evaluate(center)?,
                };
                Ok((ap_corr, ap_corr_err))
            });
            let Ok((ap_corr, ap_corr_err)) = evaluated else {
                summary.failed += 1;
                metrics::record_ap_corr_source(&info.name, false);
                continue;
            };

            if info.do_ap_corr_column {
                record.set(info.ap_corr_key, ap_corr);
                record.set(info.ap_corr_err_key, ap_corr_err);
            }

            if ap_corr <= 0.0 || ap_corr_err < 0.0 {
                summary.failed += 1;
                metrics::record_ap_corr_source(&info.name, false);
                continue;
            }

            let inst_flux = record.get(info.inst_flux_key);
            let inst_flux_err = record.get(info.inst_flux_err_key);
            record.set(info.inst_flux_key, inst_flux * ap_corr);
            let corrected_err = match self.flux_err_mode {
                FluxErrMode::Naive => inst_flux_err * ap_corr,
                FluxErrMode::Full => {
                    let a = inst_flux_err / inst_flux;
                    let b = ap_corr_err / ap_corr;
                    (inst_flux * ap_corr).abs() * (a * a + b * b).sqrt()
                }
            };
            record.set(info.inst_flux_err_key, corrected_err);

            record.set(info.ap_corr_flag_key, false);
            if self.do_flag_ap_corr_failures {
                record.set(info.flux_flag_key, old_flux_flag);
            }

            summary.corrected += 1;
            summary.applied.push(ap_corr);
            metrics::record_ap_corr_source(&info.name, true);
        }

        if tracing::enabled!(Level::DEBUG) {
            log_field_statistics(info, catalog);
        }

        summary
    }
}

fn log_field_statistics(info: &ApCorrInfo, catalog: &SourceCatalog) {
    let mut ap_corr = RunningStats::new();
    let mut ap_corr_err = RunningStats::new();
    for record in catalog {
        ap_corr.push(record.get(info.ap_corr_key));
        ap_corr_err.push(record.get(info.ap_corr_err_key));
    }
    debug!(
        field = %info.name,
        mean_ap_corr = ap_corr.mean(),
        std_dev_ap_corr = ap_corr.std_dev(),
        mean_ap_corr_err = ap_corr_err.mean(),
        std_dev_ap_corr_err = ap_corr_err.std_dev(),
        sources = catalog.len(),
        "aperture correction statistics"
    );
}
