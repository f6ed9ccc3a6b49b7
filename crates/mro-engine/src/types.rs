//! Result types for review and optimization runs
//!
//! All of these are created once per artifact per run and never mutated;
//! re-running a phase supersedes the previous entry by artifact name.

use serde::{Deserialize, Serialize};

/// Consolidated multi-perspective review of one artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewResult {
    /// Artifact the review belongs to
    pub artifact_name: String,
    /// Consolidated report produced by the fan-in role
    pub report_text: String,
    /// One text per analyst role, in role declaration order
    pub per_perspective_texts: Vec<String>,
}

/// Consolidated change proposal derived from a review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationPlan {
    /// Artifact the plan targets
    pub artifact_name: String,
    /// Prioritized proposal: original snippet, proposed snippet, and
    /// rationale per change
    pub plan_text: String,
}

/// Fully rewritten artifact bodies produced by executing a plan
///
/// An empty body means extraction found no matching fenced block in the
/// apply output; that is an expected outcome, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedChange {
    /// Artifact the change belongs to
    pub artifact_name: String,
    /// Definition body before the rewrite
    pub original_definition: String,
    /// Documentation body before the rewrite
    pub original_metadata: String,
    /// Rewritten definition body
    pub new_definition: String,
    /// Rewritten documentation body
    pub new_metadata: String,
}

/// Scored evaluation of an applied change against the original review
///
/// The narrative is the authoritative record; the typed fields are a
/// best-effort deterministic parse of it and stay empty/`None` when the
/// narrative does not yield them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    /// Artifact the evaluation belongs to
    pub artifact_name: String,
    /// Full evaluation narrative
    pub evaluation_text: String,
    /// Review issues the evaluation lists as resolved
    pub resolved_issues: Vec<String>,
    /// Stated percentage of review issues resolved
    pub resolution_percentage: Option<f64>,
    /// Issues the evaluation flags as newly introduced
    pub new_issues: Vec<String>,
    /// Overall improvement score on a 0-100 scale
    pub overall_score: Option<u8>,
}
