//! Run-scoped result accumulation
//!
//! One `RunContext` owns everything a single review/optimize run
//! accumulates. It is passed explicitly through the scheduler and engines,
//! so independent runs never share state. Insertion is by-name overwrite:
//! re-running a phase supersedes earlier entries instead of duplicating
//! them.

use crate::optimizer::OptimizationOutcome;
use crate::types::{AppliedChange, EvaluationMetrics, OptimizationPlan, ReviewResult};
use indexmap::IndexMap;
use mro_registry::ArtifactSet;

/// Accumulated state of one run
#[derive(Debug, Default)]
pub struct RunContext {
    artifacts: ArtifactSet,
    reviews: IndexMap<String, ReviewResult>,
    plans: IndexMap<String, OptimizationPlan>,
    changes: IndexMap<String, AppliedChange>,
    evaluations: IndexMap<String, EvaluationMetrics>,
}

impl RunContext {
    /// Create a context for the discovered artifact set
    #[inline]
    #[must_use]
    pub fn new(artifacts: ArtifactSet) -> Self {
        Self {
            artifacts,
            reviews: IndexMap::new(),
            plans: IndexMap::new(),
            changes: IndexMap::new(),
            evaluations: IndexMap::new(),
        }
    }

    /// Artifact set this run operates over
    #[inline]
    #[must_use]
    pub fn artifacts(&self) -> &ArtifactSet {
        &self.artifacts
    }

    /// Completed reviews, keyed by artifact name
    #[inline]
    #[must_use]
    pub fn reviews(&self) -> &IndexMap<String, ReviewResult> {
        &self.reviews
    }

    /// Completed optimization plans, keyed by artifact name
    #[inline]
    #[must_use]
    pub fn plans(&self) -> &IndexMap<String, OptimizationPlan> {
        &self.plans
    }

    /// Applied changes, keyed by artifact name
    #[inline]
    #[must_use]
    pub fn changes(&self) -> &IndexMap<String, AppliedChange> {
        &self.changes
    }

    /// Evaluations, keyed by artifact name
    #[inline]
    #[must_use]
    pub fn evaluations(&self) -> &IndexMap<String, EvaluationMetrics> {
        &self.evaluations
    }

    /// Review for one artifact, if it has run
    #[inline]
    #[must_use]
    pub fn review_for(&self, name: &str) -> Option<&ReviewResult> {
        self.reviews.get(name)
    }

    /// Record a review, superseding any previous one for the same name
    pub fn insert_review(&mut self, review: ReviewResult) {
        self.reviews.insert(review.artifact_name.clone(), review);
    }

    /// Record a full optimization outcome for one artifact
    pub fn insert_outcome(&mut self, outcome: OptimizationOutcome) {
        let OptimizationOutcome {
            plan,
            change,
            metrics,
        } = outcome;
        self.plans.insert(plan.artifact_name.clone(), plan);
        self.changes.insert(change.artifact_name.clone(), change);
        self.evaluations
            .insert(metrics.artifact_name.clone(), metrics);
    }
}
