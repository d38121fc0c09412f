//! End-to-end tests exercising the facade against mock collaborators.

use crate::collaborators::Collaborators;
use crate::config::{PipelineConfig, StageConfig};
use crate::document::Document;
use crate::graph;
use crate::processor::DocumentProcessor;
use crate::stage::Stage;
use crate::status::DocumentStatus;
use crate::testing::{
    failing_analyzer_collaborators, mock_collaborators, valid_document, MockAiAnalyzer,
    MockDocumentStore, MockEmbeddingIndexer, MockPredictiveAnalyzer,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test]
async fn full_run_produces_successful_results_in_dependency_order() {
    let store = Arc::new(MockDocumentStore::new());
    let collaborators = Collaborators::new(
        Arc::new(MockAiAnalyzer::new()),
        Arc::new(MockEmbeddingIndexer::new()),
        Arc::new(MockPredictiveAnalyzer::new()),
        store.clone(),
    );
    let processor = DocumentProcessor::new(collaborators);

    let result = processor
        .process_document(valid_document().with_id("case-001"))
        .await;

    assert_eq!(result.status, DocumentStatus::Completed);
    assert_eq!(result.results.len(), Stage::ALL.len());
    for stage in Stage::ALL {
        let entry = &result.results[&stage];
        assert!(entry.success, "{stage} should have succeeded");
        for dep in graph::dependencies(stage) {
            assert!(result.results[dep].completed_at <= entry.completed_at);
        }
    }
    assert_eq!(store.persisted(), vec!["case-001"]);
}

#[tokio::test]
async fn result_status_is_always_terminal_on_return() {
    let processor = DocumentProcessor::new(mock_collaborators());

    let completed = processor.process_document(valid_document()).await;
    let rejected = processor.process_document(Document::new("")).await;

    assert!(completed.status.is_terminal());
    assert!(rejected.status.is_terminal());
}

#[tokio::test(start_paused = true)]
async fn exhausted_ai_retries_fail_the_run_with_expected_backoff() {
    let processor = DocumentProcessor::new(failing_analyzer_collaborators("quota exceeded"));
    let started = Instant::now();

    let result = processor.process_document(valid_document()).await;

    // AI stage default: 3 retries, so 4 attempts and backoff 2s + 4s + 8s.
    assert_eq!(result.status, DocumentStatus::Failed);
    let analysis = &result.results[&Stage::AnalyzeWithAi];
    assert!(!analysis.success);
    assert_eq!(analysis.attempt, 4);
    assert!(started.elapsed() >= Duration::from_secs(14));

    assert!(result.results.contains_key(&Stage::Validate));
    assert!(!result.results.contains_key(&Stage::GenerateVectors));
    assert!(!result.results.contains_key(&Stage::RunPredictiveAnalysis));
    assert!(!result.results.contains_key(&Stage::Store));
    assert!(result.errors.iter().any(|e| e.contains("quota exceeded")));
}

#[tokio::test(start_paused = true)]
async fn flaky_analyzer_recovers_within_its_retry_budget() {
    let analyzer = MockAiAnalyzer::new();
    analyzer.script.fail_times(2);
    let collaborators = Collaborators::new(
        Arc::new(analyzer),
        Arc::new(MockEmbeddingIndexer::new()),
        Arc::new(MockPredictiveAnalyzer::new()),
        Arc::new(MockDocumentStore::new()),
    );
    let processor = DocumentProcessor::new(collaborators);

    let result = processor
        .process_document(valid_document().with_id("flaky-1"))
        .await;

    assert_eq!(result.status, DocumentStatus::Completed);
    assert_eq!(result.results[&Stage::AnalyzeWithAi].attempt, 3);

    let status = processor.get_processing_status("flaky-1").unwrap();
    assert_eq!(status.retry_counts.get(&Stage::AnalyzeWithAi), Some(&2));
    assert_eq!(status.retry_counts.get(&Stage::Validate), Some(&0));
}

#[tokio::test(start_paused = true)]
async fn mixed_batch_updates_metrics_for_every_document() {
    let config = PipelineConfig::default().with_stage_config(
        Stage::AnalyzeWithAi,
        StageConfig {
            retry_count: 0,
            timeout_secs: 120,
            backoff_base_ms: 1000,
        },
    );

    let analyzer = MockAiAnalyzer::new();
    analyzer.script.fail_times(1); // fails exactly one document's run
    let collaborators = Collaborators::new(
        Arc::new(analyzer),
        Arc::new(MockEmbeddingIndexer::new()),
        Arc::new(MockPredictiveAnalyzer::new()),
        Arc::new(MockDocumentStore::new()),
    );
    let processor = DocumentProcessor::builder(collaborators)
        .with_config(config)
        .build();

    let results = processor
        .process_batch(vec![
            valid_document().with_id("fails-analysis"),
            Document::new("").with_id("fails-validation"),
            valid_document().with_id("succeeds"),
        ])
        .await;

    assert_eq!(results.len(), 3);
    assert!(results[0].is_failed());
    assert!(results[1].is_failed());
    assert!(results[2].is_completed());

    let metrics = processor.get_processing_metrics();
    assert_eq!(metrics.pipeline.total_documents, 3);
    assert_eq!(metrics.pipeline.successful_documents, 1);
    assert_eq!(metrics.pipeline.failed_documents, 2);
    assert_eq!(metrics.documents_in_flight, 0);
    assert!(metrics.pipeline.average_pipeline_time >= 0.0);
}

#[tokio::test]
async fn completed_status_holds_successful_entry_for_every_stage() {
    let processor = DocumentProcessor::new(mock_collaborators());
    let result = processor
        .process_document(valid_document().with_id("audit-1"))
        .await;
    assert!(result.is_completed());

    let status = processor.get_processing_status("audit-1").unwrap();
    assert_eq!(status.status, DocumentStatus::Completed);
    for stage in Stage::ALL {
        assert!(status.stage_results[&stage].success);
    }
    assert!(status.errors.is_empty());
    assert!(status.pipeline_time().is_some());
}

#[tokio::test]
async fn stage_timings_accumulate_across_documents() {
    let processor = DocumentProcessor::new(mock_collaborators());
    processor.process_document(valid_document()).await;
    processor.process_document(valid_document()).await;

    let metrics = processor.get_processing_metrics();
    for stage in Stage::ALL {
        let summary = metrics.pipeline.stage_timings.get(&stage).unwrap();
        assert_eq!(summary.samples, 2, "{stage} should have two samples");
    }
}
