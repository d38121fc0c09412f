//! Pipeline configuration.
//!
//! Per-stage retry counts and timeouts, plus document validation bounds.
//! All fields are serde-deserializable so deployments can override the
//! defaults from a config file.

use crate::stage::Stage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Configuration for one stage's retry policy and deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Maximum retries after the first attempt.
    pub retry_count: u32,
    /// Per-attempt deadline in seconds.
    pub timeout_secs: u64,
    /// Base backoff unit in milliseconds (delay before retry `k` is
    /// `min(base * 2^k, 30s)`).
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

fn default_backoff_base_ms() -> u64 {
    1000
}

impl StageConfig {
    /// Returns the default configuration for the given stage.
    ///
    /// Network-bound stages retry more aggressively than local validation.
    #[must_use]
    pub fn default_for(stage: Stage) -> Self {
        let (retry_count, timeout_secs) = match stage {
            Stage::Validate => (2, 30),
            Stage::AnalyzeWithAi => (3, 120),
            Stage::GenerateVectors => (3, 60),
            Stage::RunPredictiveAnalysis => (2, 90),
            Stage::Store => (3, 30),
        };
        Self {
            retry_count,
            timeout_secs,
            backoff_base_ms: default_backoff_base_ms(),
        }
    }

    /// Returns the per-attempt deadline.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Minimum accepted content length in characters.
    #[serde(default = "default_min_content_length")]
    pub min_content_length: usize,
    /// Maximum accepted content length in characters.
    #[serde(default = "default_max_content_length")]
    pub max_content_length: usize,
    /// Per-stage overrides; stages absent here use their defaults.
    #[serde(default)]
    pub stages: BTreeMap<Stage, StageConfig>,
}

fn default_min_content_length() -> usize {
    10
}

fn default_max_content_length() -> usize {
    1_000_000
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_content_length: default_min_content_length(),
            max_content_length: default_max_content_length(),
            stages: BTreeMap::new(),
        }
    }
}

impl PipelineConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the configuration for one stage.
    #[must_use]
    pub fn with_stage_config(mut self, stage: Stage, config: StageConfig) -> Self {
        self.stages.insert(stage, config);
        self
    }

    /// Returns the effective configuration for a stage.
    #[must_use]
    pub fn stage(&self, stage: Stage) -> StageConfig {
        self.stages
            .get(&stage)
            .copied()
            .unwrap_or_else(|| StageConfig::default_for(stage))
    }
}
