//! Measurement metrics
//!
//! Prometheus counters for plugin invocations and aperture correction, plus
//! an in-memory aggregator for end-of-run summaries.

use std::collections::BTreeMap;

use metrics::counter;

/// Classification of a recovered or fatal plugin failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Expected failure handed to the plugin's `fail`
    Measurement,
    /// Unclassified failure, logged and skipped
    Other,
    /// Aborted the run
    Fatal,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Measurement => "measurement",
            Self::Other => "other",
            Self::Fatal => "fatal",
        }
    }
}

/// Count one guarded `calculate` call
pub fn record_plugin_invocation(plugin: &str) {
    counter!(
        "meas_calc_plugin_invocations_total",
        "plugin" => plugin.to_string()
    )
    .increment(1);
}

/// Count one plugin failure
pub fn record_plugin_failure(plugin: &str, kind: FailureKind) {
    counter!(
        "meas_calc_plugin_failures_total",
        "plugin" => plugin.to_string(),
        "kind" => kind.as_str()
    )
    .increment(1);
}

/// Count one source visited by the aperture correction of `field`
pub fn record_ap_corr_source(field: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "meas_calc_ap_corr_sources_total",
        "field" => field.to_string(),
        "status" => status
    )
    .increment(1);
}

/// Per-plugin counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PluginCounts {
    pub invocations: u64,
    pub measurement_failures: u64,
    pub other_failures: u64,
}

/// Per-field aperture correction counts
#[derive(Debug, Clone, Default)]
pub struct ApCorrCounts {
    pub corrected: u64,
    pub failed: u64,
    /// Applied correction values
    pub values: RunningStats,
}

/// In-memory aggregation of a run
#[derive(Debug, Clone, Default)]
pub struct MeasurementMetricsAggregator {
    pub plugins: BTreeMap<String, PluginCounts>,
    pub ap_corr: BTreeMap<String, ApCorrCounts>,
}

impl MeasurementMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_invocation(&mut self, plugin: &str) {
        self.plugins.entry(plugin.to_string()).or_default().invocations += 1;
    }

    pub fn record_failure(&mut self, plugin: &str, kind: FailureKind) {
        let counts = self.plugins.entry(plugin.to_string()).or_default();
        match kind {
            FailureKind::Measurement => counts.measurement_failures += 1,
            FailureKind::Other | FailureKind::Fatal => counts.other_failures += 1,
        }
    }

    /// Fold in counts collected elsewhere, e.g. a scheduler run summary
    pub fn absorb_plugin(&mut self, plugin: &str, counts: &PluginCounts) {
        let entry = self.plugins.entry(plugin.to_string()).or_default();
        entry.invocations += counts.invocations;
        entry.measurement_failures += counts.measurement_failures;
        entry.other_failures += counts.other_failures;
    }

    /// Record one corrected source and the correction it received
    pub fn record_ap_corr_success(&mut self, field: &str, ap_corr: f64) {
        let counts = self.ap_corr.entry(field.to_string()).or_default();
        counts.corrected += 1;
        counts.values.push(ap_corr);
    }

    pub fn record_ap_corr_failures(&mut self, field: &str, failed: u64) {
        self.ap_corr.entry(field.to_string()).or_default().failed += failed;
    }

    /// Fold in one field's aperture correction outcome
    pub fn absorb_ap_corr(
        &mut self,
        field: &str,
        corrected: u64,
        failed: u64,
        applied: &RunningStats,
    ) {
        let counts = self.ap_corr.entry(field.to_string()).or_default();
        counts.corrected += corrected;
        counts.failed += failed;
        counts.values.merge(applied);
    }

    pub fn summary(&self) -> MetricsSummary {
        let total_invocations = self.plugins.values().map(|c| c.invocations).sum();
        let total_failures = self
            .plugins
            .values()
            .map(|c| c.measurement_failures + c.other_failures)
            .sum();

        MetricsSummary {
            total_invocations,
            total_failures,
            failure_rate: if total_invocations > 0 {
                total_failures as f64 / total_invocations as f64 * 100.0
            } else {
                0.0
            },
            plugins: self.plugins.clone(),
            ap_corr: self
                .ap_corr
                .iter()
                .map(|(name, c)| {
                    let values = StatsSummary::from(&c.values);
                    (name.clone(), (c.corrected, c.failed, values))
                })
                .collect(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Summary report
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_invocations: u64,
    pub total_failures: u64,
    pub failure_rate: f64,
    pub plugins: BTreeMap<String, PluginCounts>,
    /// field -> (corrected, failed, applied values)
    pub ap_corr: BTreeMap<String, (u64, u64, StatsSummary)>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Measurement Metrics Summary ===")?;
        writeln!(f, "Plugin invocations: {}", self.total_invocations)?;
        writeln!(
            f,
            "Plugin failures: {} ({:.2}%)",
            self.total_failures, self.failure_rate
        )?;

        for (name, counts) in &self.plugins {
            writeln!(
                f,
                "  {}: calls={}, measurement={}, other={}",
                name, counts.invocations, counts.measurement_failures, counts.other_failures
            )?;
        }

        if !self.ap_corr.is_empty() {
            writeln!(f, "Aperture corrections:")?;
            for (name, (corrected, failed, values)) in &self.ap_corr {
                writeln!(
                    f,
                    "  {}: corrected={}, failed={}, apCorr {}",
                    name, corrected, failed, values
                )?;
            }
        }

        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.4}, max={:.4}, mean={:.4}, std={:.4} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online mean/variance (Welford)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
            return;
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    /// Combine with statistics gathered separately (Chan et al.)
    pub fn merge(&mut self, other: &RunningStats) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = other.clone();
            return;
        }

        let count = self.count + other.count;
        let delta = other.mean - self.mean;
        self.m2 += other.m2 + delta * delta * (self.count * other.count) as f64 / count as f64;
        self.mean += delta * other.count as f64 / count as f64;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.count = count;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
