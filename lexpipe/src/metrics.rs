//! Process-wide pipeline metrics.
//!
//! A single [`MetricsRegistry`] aggregates counters and timing statistics
//! across every document processed in this process. Mutation happens only
//! at terminal pipeline outcomes and successful stage attempts, always
//! under the registry lock, so concurrent document runs cannot lose
//! updates. Metrics are never reset except by process restart.

use crate::stage::Stage;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Raw aggregate metrics for the process lifetime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineMetrics {
    /// Documents that reached a terminal outcome.
    pub total_documents: u64,
    /// Documents that completed every stage.
    pub successful_documents: u64,
    /// Documents that failed validation or a stage.
    pub failed_documents: u64,
    /// Running mean of terminal pipeline durations in seconds.
    pub average_pipeline_time: f64,
    /// Per-stage duration samples (successful attempts only), in seconds.
    pub stage_timings: BTreeMap<Stage, Vec<f64>>,
}

/// Aggregate timing summary for one stage, derived at snapshot time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StageTimingSummary {
    /// Number of successful samples.
    pub samples: usize,
    /// Fastest successful attempt in seconds.
    pub min: f64,
    /// Mean successful attempt duration in seconds.
    pub mean: f64,
    /// Slowest successful attempt in seconds.
    pub max: f64,
}

/// Read-only point-in-time view of the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Documents that reached a terminal outcome.
    pub total_documents: u64,
    /// Documents that completed every stage.
    pub successful_documents: u64,
    /// Documents that failed.
    pub failed_documents: u64,
    /// Running mean of terminal pipeline durations in seconds.
    pub average_pipeline_time: f64,
    /// Derived per-stage timing summaries.
    pub stage_timings: BTreeMap<Stage, StageTimingSummary>,
}

/// Shared-ownership aggregator guarding [`PipelineMetrics`].
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    inner: RwLock<PipelineMetrics>,
}

impl MetricsRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the duration of one successful stage attempt.
    pub fn record_stage_timing(&self, stage: Stage, duration: Duration) {
        let mut metrics = self.inner.write();
        metrics
            .stage_timings
            .entry(stage)
            .or_default()
            .push(duration.as_secs_f64());
    }

    /// Records one terminal pipeline outcome.
    ///
    /// Updates the running average with the incremental-mean formula
    /// `new_avg = (old_avg * (n - 1) + new_value) / n`.
    pub fn record_pipeline_outcome(&self, success: bool, pipeline_time: f64) {
        let mut metrics = self.inner.write();
        metrics.total_documents += 1;
        if success {
            metrics.successful_documents += 1;
        } else {
            metrics.failed_documents += 1;
        }

        let n = metrics.total_documents as f64;
        metrics.average_pipeline_time =
            (metrics.average_pipeline_time * (n - 1.0) + pipeline_time) / n;
    }

    /// Returns a point-in-time snapshot with derived stage summaries.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let metrics = self.inner.read();
        let stage_timings = metrics
            .stage_timings
            .iter()
            .filter(|(_, samples)| !samples.is_empty())
            .map(|(stage, samples)| {
                let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
                let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let mean = samples.iter().sum::<f64>() / samples.len() as f64;
                (
                    *stage,
                    StageTimingSummary {
                        samples: samples.len(),
                        min,
                        mean,
                        max,
                    },
                )
            })
            .collect();

        MetricsSnapshot {
            total_documents: metrics.total_documents,
            successful_documents: metrics.successful_documents,
            failed_documents: metrics.failed_documents,
            average_pipeline_time: metrics.average_pipeline_time,
            stage_timings,
        }
    }
}
