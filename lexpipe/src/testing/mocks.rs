//! Mock collaborators with scriptable behavior.

use crate::collaborators::{AiAnalyzer, DocumentStore, EmbeddingIndexer, PredictiveAnalyzer};
use crate::document::Document;
use crate::stage::{Stage, StageResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Shared call-scripting state for mock collaborators.
///
/// Calls succeed by default; behavior can be scripted to fail the first
/// `n` calls, fail permanently, or hang forever.
#[derive(Debug, Default)]
pub struct CallScript {
    calls: AtomicU32,
    fail_first: AtomicU32,
    permanent_error: Mutex<Option<String>>,
    hang: AtomicBool,
}

impl CallScript {
    /// Number of calls made so far.
    #[must_use]
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Fails the first `n` calls with a transient error, then succeeds.
    pub fn fail_times(&self, n: u32) {
        self.fail_first.store(n, Ordering::SeqCst);
    }

    /// Fails every call with the given message.
    pub fn fail_always(&self, message: impl Into<String>) {
        *self.permanent_error.lock() = Some(message.into());
    }

    /// Makes every call pend forever (for deadline tests).
    pub fn hang_forever(&self) {
        self.hang.store(true, Ordering::SeqCst);
    }

    async fn run(&self) -> anyhow::Result<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.hang.load(Ordering::SeqCst) {
            futures::future::pending::<()>().await;
        }
        if let Some(message) = self.permanent_error.lock().clone() {
            anyhow::bail!(message);
        }
        if call <= self.fail_first.load(Ordering::SeqCst) {
            anyhow::bail!("transient failure on call {call}");
        }
        Ok(())
    }
}

/// Mock AI analysis service.
#[derive(Debug, Default)]
pub struct MockAiAnalyzer {
    /// Scriptable call behavior.
    pub script: CallScript,
}

impl MockAiAnalyzer {
    /// Creates a mock that always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AiAnalyzer for MockAiAnalyzer {
    async fn analyze(&self, document: &Document) -> anyhow::Result<serde_json::Value> {
        self.script.run().await?;
        Ok(serde_json::json!({
            "summary": format!("Summary of {} characters", document.content_len()),
            "classification": document.document_type.clone().unwrap_or_else(|| "unknown".to_string()),
            "extraction": { "parties": [], "dates": [] },
        }))
    }
}

/// Mock embedding service.
#[derive(Debug, Default)]
pub struct MockEmbeddingIndexer {
    /// Scriptable call behavior.
    pub script: CallScript,
}

impl MockEmbeddingIndexer {
    /// Creates a mock that always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmbeddingIndexer for MockEmbeddingIndexer {
    async fn generate_embedding(&self, _document: &Document) -> anyhow::Result<serde_json::Value> {
        self.script.run().await?;
        Ok(serde_json::json!({ "embedded": true, "dimensions": 768 }))
    }
}

/// Mock predictive analytics service.
#[derive(Debug, Default)]
pub struct MockPredictiveAnalyzer {
    /// Scriptable call behavior.
    pub script: CallScript,
}

impl MockPredictiveAnalyzer {
    /// Creates a mock that always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PredictiveAnalyzer for MockPredictiveAnalyzer {
    async fn predict(
        &self,
        _document: &Document,
        analysis: &serde_json::Value,
    ) -> anyhow::Result<serde_json::Value> {
        self.script.run().await?;
        Ok(serde_json::json!({
            "outcome": "favorable",
            "risk": "low",
            "strategy": "settle",
            "compliance": "clear",
            "based_on_analysis": !analysis.is_null(),
        }))
    }
}

/// Mock storage service that records persisted document ids.
#[derive(Debug, Default)]
pub struct MockDocumentStore {
    /// Scriptable call behavior.
    pub script: CallScript,
    persisted: Mutex<Vec<String>>,
}

impl MockDocumentStore {
    /// Creates a mock that always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the document ids persisted so far.
    #[must_use]
    pub fn persisted(&self) -> Vec<String> {
        self.persisted.lock().clone()
    }
}

#[async_trait]
impl DocumentStore for MockDocumentStore {
    async fn persist(
        &self,
        document_id: &str,
        results: &BTreeMap<Stage, StageResult>,
    ) -> anyhow::Result<serde_json::Value> {
        self.script.run().await?;
        self.persisted.lock().push(document_id.to_string());
        Ok(serde_json::json!({ "stored": true, "stages_recorded": results.len() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_script_succeeds_by_default() {
        let analyzer = MockAiAnalyzer::new();
        let doc = Document::new("some legal text for analysis");

        assert!(analyzer.analyze(&doc).await.is_ok());
        assert_eq!(analyzer.script.call_count(), 1);
    }

    #[tokio::test]
    async fn test_script_fail_times_then_succeeds() {
        let indexer = MockEmbeddingIndexer::new();
        indexer.script.fail_times(2);
        let doc = Document::new("text");

        assert!(indexer.generate_embedding(&doc).await.is_err());
        assert!(indexer.generate_embedding(&doc).await.is_err());
        assert!(indexer.generate_embedding(&doc).await.is_ok());
    }

    #[tokio::test]
    async fn test_script_fail_always() {
        let store = MockDocumentStore::new();
        store.script.fail_always("unreachable");

        let err = store.persist("doc-1", &BTreeMap::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "unreachable");
        assert!(store.persisted().is_empty());
    }

    #[tokio::test]
    async fn test_store_records_persisted_ids() {
        let store = MockDocumentStore::new();
        store.persist("doc-1", &BTreeMap::new()).await.unwrap();
        store.persist("doc-2", &BTreeMap::new()).await.unwrap();

        assert_eq!(store.persisted(), vec!["doc-1", "doc-2"]);
    }
}
