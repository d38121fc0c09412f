//! Test doubles and fixtures.
//!
//! Mock collaborators with scriptable failure behavior, plus convenience
//! constructors used across the crate's tests. Public so downstream
//! consumers can test their own wiring against the pipeline.

mod mocks;

pub use mocks::{
    CallScript, MockAiAnalyzer, MockDocumentStore, MockEmbeddingIndexer, MockPredictiveAnalyzer,
};

use crate::collaborators::Collaborators;
use crate::document::Document;
use std::sync::Arc;

/// A document comfortably inside the default validation bounds.
#[must_use]
pub fn valid_document() -> Document {
    Document::new(
        "This Services Agreement is entered into between the parties named \
         below and sets forth the terms under which services are provided.",
    )
    .with_document_type("contract")
}

/// Collaborators where every service succeeds.
#[must_use]
pub fn mock_collaborators() -> Collaborators {
    Collaborators::new(
        Arc::new(MockAiAnalyzer::new()),
        Arc::new(MockEmbeddingIndexer::new()),
        Arc::new(MockPredictiveAnalyzer::new()),
        Arc::new(MockDocumentStore::new()),
    )
}

/// Collaborators where the AI analyzer permanently fails.
#[must_use]
pub fn failing_analyzer_collaborators(message: impl Into<String>) -> Collaborators {
    let analyzer = MockAiAnalyzer::new();
    analyzer.script.fail_always(message);
    Collaborators::new(
        Arc::new(analyzer),
        Arc::new(MockEmbeddingIndexer::new()),
        Arc::new(MockPredictiveAnalyzer::new()),
        Arc::new(MockDocumentStore::new()),
    )
}

/// Collaborators where the storage service permanently fails.
#[must_use]
pub fn failing_store_collaborators(message: impl Into<String>) -> Collaborators {
    let store = MockDocumentStore::new();
    store.script.fail_always(message);
    Collaborators::new(
        Arc::new(MockAiAnalyzer::new()),
        Arc::new(MockEmbeddingIndexer::new()),
        Arc::new(MockPredictiveAnalyzer::new()),
        Arc::new(store),
    )
}

/// Collaborators where the AI analyzer never responds.
#[must_use]
pub fn hanging_analyzer_collaborators() -> Collaborators {
    let analyzer = MockAiAnalyzer::new();
    analyzer.script.hang_forever();
    Collaborators::new(
        Arc::new(analyzer),
        Arc::new(MockEmbeddingIndexer::new()),
        Arc::new(MockPredictiveAnalyzer::new()),
        Arc::new(MockDocumentStore::new()),
    )
}
