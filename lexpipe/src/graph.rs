//! Fixed stage dependency graph.
//!
//! The partial order is: Validate → AnalyzeWithAi → {GenerateVectors,
//! RunPredictiveAnalysis} → Store. The orchestrator walks stages in the
//! fixed topological order and gates each one on its dependency set.

use crate::stage::{Stage, StageResult};
use std::collections::BTreeMap;

/// Returns the stages that must have succeeded before `stage` may run.
#[must_use]
pub fn dependencies(stage: Stage) -> &'static [Stage] {
    match stage {
        Stage::Validate => &[],
        Stage::AnalyzeWithAi => &[Stage::Validate],
        Stage::GenerateVectors | Stage::RunPredictiveAnalysis => &[Stage::AnalyzeWithAi],
        Stage::Store => &[Stage::GenerateVectors, Stage::RunPredictiveAnalysis],
    }
}

/// Returns the fixed topological execution order.
#[must_use]
pub fn execution_order() -> [Stage; 5] {
    Stage::ALL
}

/// Returns true iff every dependency of `stage` has a successful result.
#[must_use]
pub fn dependencies_met(results: &BTreeMap<Stage, StageResult>, stage: Stage) -> bool {
    dependencies(stage)
        .iter()
        .all(|dep| results.get(dep).is_some_and(|r| r.success))
}

/// Returns the dependencies of `stage` lacking a successful result.
#[must_use]
pub fn unmet_dependencies(results: &BTreeMap<Stage, StageResult>, stage: Stage) -> Vec<Stage> {
    dependencies(stage)
        .iter()
        .copied()
        .filter(|dep| !results.get(dep).is_some_and(|r| r.success))
        .collect()
}
