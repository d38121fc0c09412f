//! Pipeline orchestrator.
//!
//! Drives one document through the fixed stage order, gating each stage
//! on its dependency set, wrapping each invocation in the stage's retry
//! policy and deadline, and maintaining the document's audit record and
//! the process-wide metrics.

use crate::collaborators::Collaborators;
use crate::config::PipelineConfig;
use crate::document::Document;
use crate::errors::PipelineError;
use crate::events::EventSink;
use crate::graph;
use crate::metrics::MetricsRegistry;
use crate::processor::ProcessingResult;
use crate::retry::{Backoff, RetryPolicy};
use crate::stage::{Stage, StageResult};
use crate::status::{DocumentStatus, PipelineStatus, StatusTracker};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Executes document pipelines against a set of collaborators.
#[derive(Debug)]
pub struct PipelineOrchestrator {
    collaborators: Collaborators,
    config: Arc<PipelineConfig>,
    tracker: Arc<StatusTracker>,
    metrics: Arc<MetricsRegistry>,
    events: Arc<dyn EventSink>,
}

impl PipelineOrchestrator {
    /// Creates an orchestrator sharing the given tracker and metrics.
    #[must_use]
    pub fn new(
        collaborators: Collaborators,
        config: Arc<PipelineConfig>,
        tracker: Arc<StatusTracker>,
        metrics: Arc<MetricsRegistry>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            collaborators,
            config,
            tracker,
            metrics,
            events,
        }
    }

    /// Runs one document through all stages in dependency order.
    ///
    /// Stage failures after retries short-circuit the remaining stages, so
    /// a document whose analysis failed is never embedded, forecast, or
    /// stored. All failure paths end in a `failed` result; this method
    /// never returns a result still marked `processing`.
    pub async fn run(&self, document: &Document, document_id: &str) -> ProcessingResult {
        let run_started = Instant::now();
        let status = PipelineStatus::new(document_id);
        let start_time = status.start_time;
        self.tracker.insert(status);

        tracing::info!(document_id, "Pipeline started");

        let mut results: BTreeMap<Stage, StageResult> = BTreeMap::new();
        let mut errors: Vec<String> = Vec::new();
        let mut failed = false;

        for stage in graph::execution_order() {
            if !graph::dependencies_met(&results, stage) {
                // Unreachable when walking the fixed topological order;
                // reaching it means an orchestration bug, so fail the run
                // without retrying.
                let err = PipelineError::DependencyViolation {
                    stage,
                    missing: graph::unmet_dependencies(&results, stage),
                };
                tracing::error!(document_id, stage = %stage, error = %err, "Structural failure");
                errors.push(err.to_string());
                self.tracker
                    .with_mut(document_id, |s| s.mark_failed(err.to_string()));
                failed = true;
                break;
            }

            self.tracker.with_mut(document_id, |s| s.advance_to(stage));
            self.events.try_emit(
                "stage.started",
                Some(serde_json::json!({
                    "document_id": document_id,
                    "stage": stage.as_str(),
                })),
            );

            let stage_cfg = self.config.stage(stage);
            let policy = RetryPolicy::new(
                stage_cfg.retry_count,
                Backoff::new(
                    Duration::from_millis(stage_cfg.backoff_base_ms),
                    Backoff::DEFAULT_CAP,
                ),
            );
            let timeout = stage_cfg.timeout();
            let timeout_secs = stage_cfg.timeout_secs;

            let outcome = policy
                .run(stage.as_str(), || {
                    let attempt = self.execute_stage(stage, document, document_id, &results);
                    async move {
                        match tokio::time::timeout(timeout, attempt).await {
                            Ok(result) => result,
                            Err(_) => Err(anyhow::Error::new(PipelineError::Timeout {
                                stage,
                                timeout_secs,
                            })),
                        }
                    }
                })
                .await;

            match outcome.result {
                Ok(payload) => {
                    self.metrics
                        .record_stage_timing(stage, outcome.attempt_duration);
                    let result = StageResult::ok(payload, outcome.attempts, outcome.attempt_duration);
                    self.tracker
                        .with_mut(document_id, |s| s.record_stage(stage, result.clone()));
                    self.events.try_emit(
                        "stage.completed",
                        Some(serde_json::json!({
                            "document_id": document_id,
                            "stage": stage.as_str(),
                            "attempts": outcome.attempts,
                            "duration_ms": outcome.attempt_duration.as_millis() as u64,
                        })),
                    );
                    results.insert(stage, result);
                }
                Err(e) => {
                    let err = PipelineError::StageExecution {
                        stage,
                        attempts: outcome.attempts,
                        message: e.to_string(),
                    };
                    let result =
                        StageResult::failed(e.to_string(), outcome.attempts, outcome.attempt_duration);
                    self.tracker.with_mut(document_id, |s| {
                        s.record_stage(stage, result.clone());
                        s.mark_failed(err.to_string());
                    });
                    self.events.try_emit(
                        "stage.failed",
                        Some(serde_json::json!({
                            "document_id": document_id,
                            "stage": stage.as_str(),
                            "attempts": outcome.attempts,
                            "error": e.to_string(),
                        })),
                    );
                    results.insert(stage, result);
                    errors.push(err.to_string());
                    failed = true;
                    break;
                }
            }
        }

        let pipeline_time = run_started.elapsed().as_secs_f64();
        let final_status = if failed {
            DocumentStatus::Failed
        } else {
            self.tracker.with_mut(document_id, |s| s.mark_completed());
            DocumentStatus::Completed
        };

        // Metrics are updated exactly once, after the terminal transition.
        self.metrics.record_pipeline_outcome(!failed, pipeline_time);
        self.events.try_emit(
            if failed {
                "pipeline.failed"
            } else {
                "pipeline.completed"
            },
            Some(serde_json::json!({
                "document_id": document_id,
                "pipeline_time": pipeline_time,
            })),
        );
        tracing::info!(
            document_id,
            status = %final_status,
            pipeline_time,
            "Pipeline finished"
        );

        ProcessingResult {
            document_id: document_id.to_string(),
            status: final_status,
            processing_time: pipeline_time,
            results,
            errors,
            timestamp: start_time,
        }
    }

    /// Dispatches one stage attempt to its handler or collaborator.
    async fn execute_stage(
        &self,
        stage: Stage,
        document: &Document,
        document_id: &str,
        results: &BTreeMap<Stage, StageResult>,
    ) -> anyhow::Result<serde_json::Value> {
        match stage {
            Stage::Validate => self.validate(document),
            Stage::AnalyzeWithAi => self.collaborators.analyzer.analyze(document).await,
            Stage::GenerateVectors => {
                self.collaborators.indexer.generate_embedding(document).await
            }
            Stage::RunPredictiveAnalysis => {
                let analysis = results
                    .get(&Stage::AnalyzeWithAi)
                    .map(|r| r.payload.clone())
                    .unwrap_or(serde_json::Value::Null);
                self.collaborators.predictor.predict(document, &analysis).await
            }
            Stage::Store => self.collaborators.store.persist(document_id, results).await,
        }
    }

    /// Structural validation of the accepted document.
    fn validate(&self, document: &Document) -> anyhow::Result<serde_json::Value> {
        let len = document
            .check_content(self.config.min_content_length, self.config.max_content_length)
            .map_err(|msg| anyhow::Error::new(PipelineError::Validation(msg)))?;

        Ok(serde_json::json!({
            "valid": true,
            "content_length": len,
            "document_type": document.document_type,
        }))
    }
}
