//! External collaborator traits.
//!
//! The pipeline consumes its AI, embedding, predictive, and storage
//! services through these narrow async traits. Collaborator failures are
//! opaque to the pipeline (`anyhow::Error`); any error triggers the
//! owning stage's retry policy, and the pipeline does not interpret
//! partial failures within a collaborator's own sub-results.

use crate::document::Document;
use crate::stage::{Stage, StageResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

/// AI analysis service: extraction, summarization, classification.
#[async_trait]
pub trait AiAnalyzer: Send + Sync + Debug {
    /// Analyzes document content and returns named analyses as one payload.
    async fn analyze(&self, document: &Document) -> anyhow::Result<serde_json::Value>;
}

/// Embedding generation service.
#[async_trait]
pub trait EmbeddingIndexer: Send + Sync + Debug {
    /// Generates an embedding for the document and returns an acknowledgement.
    async fn generate_embedding(&self, document: &Document) -> anyhow::Result<serde_json::Value>;
}

/// Predictive analytics service: outcome, risk, strategy, compliance.
#[async_trait]
pub trait PredictiveAnalyzer: Send + Sync + Debug {
    /// Forecasts outcomes from the document and its prior AI analysis.
    async fn predict(
        &self,
        document: &Document,
        analysis: &serde_json::Value,
    ) -> anyhow::Result<serde_json::Value>;
}

/// Persistent storage for accumulated pipeline results.
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug {
    /// Persists the results for a document and returns an acknowledgement.
    async fn persist(
        &self,
        document_id: &str,
        results: &BTreeMap<Stage, StageResult>,
    ) -> anyhow::Result<serde_json::Value>;
}

/// The full set of collaborators a pipeline needs.
#[derive(Debug, Clone)]
pub struct Collaborators {
    /// AI analysis service.
    pub analyzer: Arc<dyn AiAnalyzer>,
    /// Embedding generation service.
    pub indexer: Arc<dyn EmbeddingIndexer>,
    /// Predictive analytics service.
    pub predictor: Arc<dyn PredictiveAnalyzer>,
    /// Result storage.
    pub store: Arc<dyn DocumentStore>,
}

impl Collaborators {
    /// Bundles the four collaborator services.
    #[must_use]
    pub fn new(
        analyzer: Arc<dyn AiAnalyzer>,
        indexer: Arc<dyn EmbeddingIndexer>,
        predictor: Arc<dyn PredictiveAnalyzer>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            analyzer,
            indexer,
            predictor,
            store,
        }
    }
}
