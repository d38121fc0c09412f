//! Stage enumeration and per-stage result types.
//!
//! Stages form a closed set so that dependency declarations and result maps
//! are exhaustiveness-checked at compile time. The derived `Ord` follows
//! pipeline position, so ordered maps iterate in dependency order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A named unit of work in the document pipeline.
///
/// Variants are declared in topological execution order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Structural validation of the accepted document.
    Validate,
    /// AI analysis of the document content (extraction, summary, classification).
    AnalyzeWithAi,
    /// Embedding generation for vector search.
    GenerateVectors,
    /// Outcome, risk, strategy, and compliance forecasting.
    RunPredictiveAnalysis,
    /// Persistence of the accumulated results.
    Store,
}

impl Stage {
    /// All stages in fixed topological execution order.
    pub const ALL: [Self; 5] = [
        Self::Validate,
        Self::AnalyzeWithAi,
        Self::GenerateVectors,
        Self::RunPredictiveAnalysis,
        Self::Store,
    ];

    /// Returns the stable snake_case name of the stage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::AnalyzeWithAi => "analyze_with_ai",
            Self::GenerateVectors => "generate_vectors",
            Self::RunPredictiveAnalysis => "run_predictive_analysis",
            Self::Store => "store",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome record of one stage invocation.
///
/// Created fresh per run of the retry policy; only the final attempt's
/// result is retained in the status map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageResult {
    /// Whether the stage ultimately succeeded.
    pub success: bool,
    /// Error message if the stage failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Duration of the final attempt in seconds.
    pub execution_time: f64,
    /// 1-based attempt count at success or exhaustion.
    pub attempt: u32,
    /// Stage-specific payload (null on failure).
    #[serde(default)]
    pub payload: serde_json::Value,
    /// When the final attempt completed.
    pub completed_at: DateTime<Utc>,
}

impl StageResult {
    /// Creates a successful stage result.
    #[must_use]
    pub fn ok(payload: serde_json::Value, attempt: u32, execution_time: Duration) -> Self {
        Self {
            success: true,
            error: None,
            execution_time: execution_time.as_secs_f64(),
            attempt,
            payload,
            completed_at: Utc::now(),
        }
    }

    /// Creates a failed stage result carrying the last error observed.
    #[must_use]
    pub fn failed(error: impl Into<String>, attempt: u32, execution_time: Duration) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            execution_time: execution_time.as_secs_f64(),
            attempt,
            payload: serde_json::Value::Null,
            completed_at: Utc::now(),
        }
    }
}
