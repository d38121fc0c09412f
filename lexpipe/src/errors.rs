//! Error types for the lexpipe pipeline.
//!
//! The taxonomy distinguishes three failure classes: document validation
//! errors (terminal, never retried), stage execution errors (retried until
//! the stage's policy is exhausted), and structural dependency violations
//! (fatal orchestration bugs, never retried).

use crate::stage::Stage;
use thiserror::Error;

/// The main error type for pipeline operations.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// Document failed input validation before entering the pipeline.
    #[error("Document validation failed: {0}")]
    Validation(String),

    /// A stage failed after exhausting its retry policy.
    #[error("Stage '{stage}' failed after {attempts} attempt(s): {message}")]
    StageExecution {
        /// The stage that failed.
        stage: Stage,
        /// Total attempts made, including the first.
        attempts: u32,
        /// The last error observed.
        message: String,
    },

    /// A stage was invoked before all of its dependencies succeeded.
    ///
    /// This indicates an orchestration bug, not a data or service problem,
    /// and is always fatal for the run.
    #[error("Dependencies not met for stage '{stage}': missing successful results for {missing:?}")]
    DependencyViolation {
        /// The stage whose dependencies were unmet.
        stage: Stage,
        /// Dependencies without a successful result.
        missing: Vec<Stage>,
    },

    /// A stage attempt exceeded its configured deadline.
    #[error("Stage '{stage}' timed out after {timeout_secs}s")]
    Timeout {
        /// The stage that timed out.
        stage: Stage,
        /// The configured deadline in seconds.
        timeout_secs: u64,
    },

    /// A generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Returns true if the error signals an orchestration bug rather than
    /// a data or collaborator failure.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::DependencyViolation { .. } | Self::Internal(_))
    }

    /// Returns true if the error is eligible for stage-level retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StageExecution { .. } | Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_violation_is_structural() {
        let err = PipelineError::DependencyViolation {
            stage: Stage::Store,
            missing: vec![Stage::GenerateVectors],
        };
        assert!(err.is_structural());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_validation_is_not_retryable() {
        let err = PipelineError::Validation("content is empty".to_string());
        assert!(!err.is_retryable());
        assert!(!err.is_structural());
    }

    #[test]
    fn test_stage_execution_message() {
        let err = PipelineError::StageExecution {
            stage: Stage::AnalyzeWithAi,
            attempts: 4,
            message: "connection reset".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("analyze_with_ai"));
        assert!(msg.contains("4 attempt(s)"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn test_timeout_is_retryable() {
        let err = PipelineError::Timeout {
            stage: Stage::GenerateVectors,
            timeout_secs: 60,
        };
        assert!(err.is_retryable());
    }
}
