//! Per-document pipeline status tracking.
//!
//! Every document entering the pipeline gets a [`PipelineStatus`] record
//! in the process-wide [`StatusTracker`]. Records are mutated as stages
//! complete and never deleted within the process lifetime; after a
//! terminal transition they act as an append-only audit trail.

use crate::stage::{Stage, StageResult};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Terminal-or-in-flight status of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// The pipeline is still running.
    Processing,
    /// All stages succeeded.
    Completed,
    /// A validation, stage, or structural failure ended the run.
    Failed,
}

impl DocumentStatus {
    /// Returns true if the status is terminal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Mutable audit record of one document's progress through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStatus {
    /// The document this record tracks.
    pub document_id: String,
    /// Current lifecycle status.
    pub status: DocumentStatus,
    /// The stage currently (or last) being executed. Only ever advances
    /// forward in the dependency graph; never regresses.
    pub current_stage: Stage,
    /// When the document entered the pipeline.
    pub start_time: DateTime<Utc>,
    /// When the run reached a terminal state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Result of every attempted stage, in dependency order.
    #[serde(default)]
    pub stage_results: BTreeMap<Stage, StageResult>,
    /// Ordered error messages accumulated during the run.
    #[serde(default)]
    pub errors: Vec<String>,
    /// Retries consumed per stage (attempts beyond the first).
    #[serde(default)]
    pub retry_counts: BTreeMap<Stage, u32>,
}

impl PipelineStatus {
    /// Creates a fresh record for a document entering the pipeline.
    #[must_use]
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            status: DocumentStatus::Processing,
            current_stage: Stage::Validate,
            start_time: Utc::now(),
            end_time: None,
            stage_results: BTreeMap::new(),
            errors: Vec::new(),
            retry_counts: BTreeMap::new(),
        }
    }

    /// Marks a stage as the one currently executing.
    pub fn advance_to(&mut self, stage: Stage) {
        // Forward-only by construction: the orchestrator walks the fixed
        // topological order.
        self.current_stage = stage;
    }

    /// Records the final result of a stage invocation.
    pub fn record_stage(&mut self, stage: Stage, result: StageResult) {
        self.retry_counts
            .insert(stage, result.attempt.saturating_sub(1));
        self.stage_results.insert(stage, result);
    }

    /// Transitions the record to completed.
    pub fn mark_completed(&mut self) {
        self.status = DocumentStatus::Completed;
        self.end_time = Some(Utc::now());
    }

    /// Transitions the record to failed, appending the error.
    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.status = DocumentStatus::Failed;
        self.end_time = Some(Utc::now());
    }

    /// Elapsed wall-clock seconds, if the run has finished.
    #[must_use]
    pub fn pipeline_time(&self) -> Option<f64> {
        self.end_time
            .map(|end| (end - self.start_time).num_milliseconds() as f64 / 1000.0)
    }
}

/// Process-wide map of per-document pipeline status records.
///
/// Concurrent document runs mutate their own entries; the map itself is
/// safe for shared access.
#[derive(Debug, Default)]
pub struct StatusTracker {
    documents: DashMap<String, PipelineStatus>,
}

impl StatusTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts (or replaces) the record for a document.
    pub fn insert(&self, status: PipelineStatus) {
        self.documents.insert(status.document_id.clone(), status);
    }

    /// Mutates the record for a document in place, if present.
    pub fn with_mut<F>(&self, document_id: &str, f: F)
    where
        F: FnOnce(&mut PipelineStatus),
    {
        if let Some(mut entry) = self.documents.get_mut(document_id) {
            f(entry.value_mut());
        }
    }

    /// Returns a point-in-time copy of a document's record.
    #[must_use]
    pub fn get(&self, document_id: &str) -> Option<PipelineStatus> {
        self.documents.get(document_id).map(|e| e.value().clone())
    }

    /// Number of documents currently in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.documents
            .iter()
            .filter(|e| e.value().status == DocumentStatus::Processing)
            .count()
    }

    /// Total number of tracked documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if no documents are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
