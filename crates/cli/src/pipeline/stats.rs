//! Pipeline statistics.

use std::time::Duration;

use observability::MeasurementMetricsAggregator;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Records read from the input catalog
    pub records: usize,

    /// Flux fields the aperture correction task processed
    pub ap_corr_fields: usize,

    /// Fields whose correction model was absent from the map
    pub missing_models: Vec<String>,

    /// Execution-order buckets run by catalog calculation
    pub buckets: usize,

    pub duration: Duration,

    pub metrics: MeasurementMetricsAggregator,
}

impl PipelineStats {
    /// Records processed per second
    pub fn throughput(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.records as f64 / secs
        } else {
            0.0
        }
    }

    pub fn print_summary(&self) {
        println!("\n=== Pipeline Statistics ===\n");

        println!("Overview");
        println!("   ├─ Duration: {:.3}s", self.duration.as_secs_f64());
        println!("   ├─ Records: {}", self.records);
        println!("   ├─ Records/s: {:.1}", self.throughput());
        println!("   ├─ Aperture-corrected fields: {}", self.ap_corr_fields);
        println!("   └─ Catalog calculation buckets: {}", self.buckets);

        let summary = self.metrics.summary();

        println!("\nPlugins");
        println!("   ├─ Invocations: {}", summary.total_invocations);
        println!(
            "   └─ Failures: {} ({:.2}%)",
            summary.total_failures, summary.failure_rate
        );
        for (name, counts) in &summary.plugins {
            println!(
                "      • {}: calls={}, measurement={}, other={}",
                name, counts.invocations, counts.measurement_failures, counts.other_failures
            );
        }

        if !summary.ap_corr.is_empty() {
            println!("\nAperture Corrections");
            for (name, (corrected, failed, values)) in &summary.ap_corr {
                println!(
                    "   • {}: corrected={}, failed={}, apCorr {}",
                    name, corrected, failed, values
                );
            }
        }

        if !self.missing_models.is_empty() {
            println!("\n⚠ Missing correction models");
            for name in &self.missing_models {
                println!("   - {}", name);
            }
        }

        println!();
    }
}
