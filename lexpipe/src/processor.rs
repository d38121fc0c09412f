//! Caller-facing document processor facade.
//!
//! The single entry point for consumers: validates input shape, delegates
//! to the orchestrator, and exposes batch processing and status/metrics
//! queries. Failures of any kind are captured into the returned
//! [`ProcessingResult`]; processing never raises out of the facade.

use crate::collaborators::Collaborators;
use crate::config::PipelineConfig;
use crate::document::Document;
use crate::errors::PipelineError;
use crate::events::{EventSink, NoOpEventSink};
use crate::metrics::{MetricsRegistry, MetricsSnapshot};
use crate::orchestrator::PipelineOrchestrator;
use crate::stage::{Stage, StageResult};
use crate::status::{DocumentStatus, PipelineStatus, StatusTracker};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::time::Instant;
use uuid::Uuid;

/// Final outcome of one full pipeline run for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResult {
    /// The processed document's id (caller-supplied or generated).
    pub document_id: String,
    /// Terminal status: completed or failed, never processing.
    pub status: DocumentStatus,
    /// Elapsed wall-clock seconds for the run.
    pub processing_time: f64,
    /// Per-stage results for every attempted stage.
    #[serde(default)]
    pub results: BTreeMap<Stage, StageResult>,
    /// Ordered error messages, empty on success.
    #[serde(default)]
    pub errors: Vec<String>,
    /// When the run started.
    pub timestamp: DateTime<Utc>,
}

impl ProcessingResult {
    /// Returns true if every stage succeeded.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == DocumentStatus::Completed
    }

    /// Returns true if the run ended in failure.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status == DocumentStatus::Failed
    }
}

/// Metrics snapshot returned by [`DocumentProcessor::get_processing_metrics`].
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingMetrics {
    /// Documents currently in flight (status is still processing).
    pub documents_in_flight: usize,
    /// Process-wide pipeline aggregates.
    #[serde(flatten)]
    pub pipeline: MetricsSnapshot,
}

/// Builder for [`DocumentProcessor`].
pub struct DocumentProcessorBuilder {
    collaborators: Collaborators,
    config: PipelineConfig,
    events: Arc<dyn EventSink>,
}

impl DocumentProcessorBuilder {
    /// Overrides the pipeline configuration.
    #[must_use]
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Attaches an event sink for pipeline lifecycle events.
    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Builds the processor.
    #[must_use]
    pub fn build(self) -> DocumentProcessor {
        let config = Arc::new(self.config);
        let tracker = Arc::new(StatusTracker::new());
        let metrics = Arc::new(MetricsRegistry::new());
        let orchestrator = PipelineOrchestrator::new(
            self.collaborators,
            config.clone(),
            tracker.clone(),
            metrics.clone(),
            self.events,
        );
        DocumentProcessor {
            orchestrator,
            config,
            tracker,
            metrics,
        }
    }
}

/// Caller-facing facade over the pipeline.
#[derive(Debug)]
pub struct DocumentProcessor {
    orchestrator: PipelineOrchestrator,
    config: Arc<PipelineConfig>,
    tracker: Arc<StatusTracker>,
    metrics: Arc<MetricsRegistry>,
}

impl DocumentProcessor {
    /// Creates a processor with default configuration and no event sink.
    #[must_use]
    pub fn new(collaborators: Collaborators) -> Self {
        Self::builder(collaborators).build()
    }

    /// Starts building a processor.
    #[must_use]
    pub fn builder(collaborators: Collaborators) -> DocumentProcessorBuilder {
        DocumentProcessorBuilder {
            collaborators,
            config: PipelineConfig::default(),
            events: Arc::new(NoOpEventSink),
        }
    }

    /// Processes one document through the full pipeline.
    ///
    /// Malformed input (empty, undersized, or oversized content) is
    /// rejected before any stage runs, returning a failed result with a
    /// descriptive error. A fresh UUID is assigned if the caller omitted
    /// the document id.
    pub async fn process_document(&self, document: Document) -> ProcessingResult {
        let document_id = document
            .document_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let started = Instant::now();

        if let Err(msg) = document.check_content(
            self.config.min_content_length,
            self.config.max_content_length,
        ) {
            let error = PipelineError::Validation(msg).to_string();
            tracing::warn!(document_id = %document_id, error = %error, "Document rejected before pipeline");

            let mut status = PipelineStatus::new(&document_id);
            let timestamp = status.start_time;
            status.mark_failed(&error);
            self.tracker.insert(status);

            let processing_time = started.elapsed().as_secs_f64();
            // A validation rejection is a terminal outcome and counts
            // toward the process-wide totals.
            self.metrics.record_pipeline_outcome(false, processing_time);

            return ProcessingResult {
                document_id,
                status: DocumentStatus::Failed,
                processing_time,
                results: BTreeMap::new(),
                errors: vec![error],
                timestamp,
            };
        }

        self.orchestrator.run(&document, &document_id).await
    }

    /// Processes documents sequentially, preserving input order.
    ///
    /// One document's failure never aborts the rest of the batch.
    pub async fn process_batch(&self, documents: Vec<Document>) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(documents.len());
        for document in documents {
            results.push(self.process_document(document).await);
        }
        results
    }

    /// Processes documents with bounded concurrency, preserving input order.
    ///
    /// Documents are independent, so up to `max_in_flight` pipelines run
    /// at once; results come back in input order regardless of completion
    /// order.
    pub async fn process_batch_concurrent(
        &self,
        documents: Vec<Document>,
        max_in_flight: usize,
    ) -> Vec<ProcessingResult> {
        stream::iter(documents)
            .map(|document| self.process_document(document))
            .buffered(max_in_flight.max(1))
            .collect()
            .await
    }

    /// Read-only lookup of a document's pipeline status.
    ///
    /// Returns `None` for unknown ids; never panics.
    #[must_use]
    pub fn get_processing_status(&self, document_id: &str) -> Option<PipelineStatus> {
        self.tracker.get(document_id)
    }

    /// Read-only snapshot of process-wide metrics plus in-flight count.
    #[must_use]
    pub fn get_processing_metrics(&self) -> ProcessingMetrics {
        ProcessingMetrics {
            documents_in_flight: self.tracker.in_flight(),
            pipeline: self.metrics.snapshot(),
        }
    }
}
