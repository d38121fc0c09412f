//! # Lexpipe
//!
//! A dependency-aware processing pipeline for legal documents.
//!
//! Each document runs through five stages — validation, AI analysis,
//! vector generation, predictive analysis, and storage — with:
//!
//! - **Dependency gating**: a stage runs only after every stage it depends
//!   on has succeeded
//! - **Per-stage retry policies**: bounded retries with deterministic
//!   exponential backoff, scoped so flaky network-bound stages retry
//!   without re-running completed work
//! - **Audit trail**: a per-document status record tracking every stage
//!   attempt, retry count, and error
//! - **Process-wide metrics**: document counters and per-stage timing
//!   statistics aggregated across all runs
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lexpipe::prelude::*;
//!
//! let processor = DocumentProcessor::new(collaborators);
//!
//! let result = processor
//!     .process_document(Document::new(contract_text).with_id("case-001"))
//!     .await;
//!
//! assert!(result.is_completed());
//! let metrics = processor.get_processing_metrics();
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod collaborators;
pub mod config;
pub mod document;
pub mod errors;
pub mod events;
pub mod graph;
pub mod metrics;
pub mod observability;
pub mod orchestrator;
pub mod processor;
pub mod retry;
pub mod stage;
pub mod status;
pub mod testing;

#[cfg(test)]
mod integration_tests;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::collaborators::{
        AiAnalyzer, Collaborators, DocumentStore, EmbeddingIndexer, PredictiveAnalyzer,
    };
    pub use crate::config::{PipelineConfig, StageConfig};
    pub use crate::document::Document;
    pub use crate::errors::PipelineError;
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::metrics::{MetricsRegistry, MetricsSnapshot, PipelineMetrics};
    pub use crate::orchestrator::PipelineOrchestrator;
    pub use crate::processor::{DocumentProcessor, ProcessingMetrics, ProcessingResult};
    pub use crate::retry::{Backoff, RetryOutcome, RetryPolicy};
    pub use crate::stage::{Stage, StageResult};
    pub use crate::status::{DocumentStatus, PipelineStatus, StatusTracker};
}
