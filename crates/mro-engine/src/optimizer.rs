//! Optimization engine
//!
//! Four stages per artifact, strictly ordered: plan (fan-out/fan-in with
//! rewrite-specialized roles), apply (one call emitting complete rewritten
//! bodies in fences), extract (first fence of each content type), evaluate
//! (one call scoring the change against the original review). A missing
//! fence degrades to an empty body and still flows into evaluation; there
//! is no retry across stages.

use crate::error::EngineError;
use crate::evaluation;
use crate::extract;
use crate::fanout::ParallelRoles;
use crate::roles;
use crate::types::{AppliedChange, EvaluationMetrics, OptimizationPlan, ReviewResult};
use mro_llm::{GenerationBackend, Role};
use mro_registry::ArtifactContents;
use std::sync::Arc;

/// Everything one optimization pass produces for an artifact
#[derive(Debug, Clone)]
pub struct OptimizationOutcome {
    /// The consolidated change proposal
    pub plan: OptimizationPlan,
    /// The rewritten bodies
    pub change: AppliedChange,
    /// The scored evaluation
    pub metrics: EvaluationMetrics,
}

/// Plan/apply/extract/evaluate pipeline for one artifact at a time
pub struct OptimizationEngine {
    panel: ParallelRoles,
    applier: Role,
    evaluator: Role,
    backend: Arc<dyn GenerationBackend>,
}

impl OptimizationEngine {
    /// Create an optimization engine over the given backend
    #[must_use]
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        let panel = ParallelRoles::new(
            Arc::clone(&backend),
            roles::optimization_analysts(),
            roles::optimization_consolidator(),
        );
        Self {
            panel,
            applier: roles::applier(),
            evaluator: roles::evaluator(),
            backend,
        }
    }

    /// Run the full pipeline for one artifact
    ///
    /// # Errors
    /// Any generation failure in any stage aborts the pass; extraction
    /// never fails, it degrades to empty bodies.
    pub async fn optimize(
        &self,
        name: &str,
        contents: &ArtifactContents,
        review: &ReviewResult,
    ) -> Result<OptimizationOutcome, EngineError> {
        // Plan
        let plan_request = roles::plan_request(
            name,
            &contents.definition,
            &contents.metadata,
            &review.report_text,
        );
        let plan_text = self.panel.run(&plan_request).await?.consolidated;
        tracing::debug!(artifact = name, "optimization plan generated");

        // Apply: complete rewritten bodies, not a diff
        let apply_request =
            roles::apply_request(name, &contents.definition, &contents.metadata, &plan_text);
        let applied = self.backend.generate(&self.applier, &apply_request).await?;

        // Extract: a missing fence is a valid, empty outcome
        let new_definition = extract::first_fenced(&applied, "sql").unwrap_or_default();
        let new_metadata = extract::first_fenced(&applied, "yaml").unwrap_or_default();
        if new_definition.is_empty() {
            tracing::warn!(artifact = name, "apply output had no sql fence; rewritten definition is empty");
        }
        if new_metadata.is_empty() {
            tracing::warn!(artifact = name, "apply output had no yaml fence; rewritten metadata is empty");
        }

        // Evaluate, always after apply, fed whatever extraction produced
        let evaluate_request = roles::evaluate_request(
            name,
            &review.report_text,
            &plan_text,
            &contents.definition,
            &new_definition,
            &contents.metadata,
            &new_metadata,
        );
        let evaluation_text = self
            .backend
            .generate(&self.evaluator, &evaluate_request)
            .await?;
        let metrics = evaluation::parse_metrics(name, evaluation_text);

        Ok(OptimizationOutcome {
            plan: OptimizationPlan {
                artifact_name: name.to_string(),
                plan_text,
            },
            change: AppliedChange {
                artifact_name: name.to_string(),
                original_definition: contents.definition.clone(),
                original_metadata: contents.metadata.clone(),
                new_definition,
                new_metadata,
            },
            metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mro_llm::ScriptedBackend;

    const APPLY_OUTPUT: &str = "\
Updated files below.

```sql
select 1 as id, 2 as total
```

```yaml
models:
  - name: orders
    columns:
      - name: id
      - name: total
```
";

    fn contents() -> ArtifactContents {
        ArtifactContents {
            definition: "select 1 as id".to_string(),
            metadata: "models:\n  - name: orders".to_string(),
        }
    }

    fn review() -> ReviewResult {
        ReviewResult {
            artifact_name: "orders".to_string(),
            report_text: "total is undocumented".to_string(),
            per_perspective_texts: Vec::new(),
        }
    }

    #[tokio::test]
    async fn pipeline_produces_plan_change_and_metrics() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .with_response("optimization_consolidator", "document total")
                .with_response("change_applier", APPLY_OUTPUT)
                .with_response(
                    "improvement_evaluator",
                    "Resolution percentage: 100%\nOverall score: 90/100",
                ),
        );
        let engine = OptimizationEngine::new(backend.clone());

        let outcome = engine
            .optimize("orders", &contents(), &review())
            .await
            .unwrap();

        assert_eq!(outcome.plan.plan_text, "document total");
        assert_eq!(outcome.change.new_definition, "select 1 as id, 2 as total");
        assert!(outcome.change.new_metadata.contains("name: total"));
        assert_eq!(outcome.change.original_definition, "select 1 as id");
        assert_eq!(outcome.metrics.resolution_percentage, Some(100.0));
        assert_eq!(outcome.metrics.overall_score, Some(90));

        // Apply sees the plan; evaluate sees the rewritten bodies.
        let apply_request = &backend.requests_for("change_applier")[0];
        assert!(apply_request.contains("document total"));
        let evaluate_request = &backend.requests_for("improvement_evaluator")[0];
        assert!(evaluate_request.contains("select 1 as id, 2 as total"));
    }

    #[tokio::test]
    async fn missing_fences_degrade_to_empty_bodies() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .with_response("change_applier", "```yaml\nmodels: []\n```")
                .with_response("improvement_evaluator", "nothing to score"),
        );
        let engine = OptimizationEngine::new(backend.clone());

        let outcome = engine
            .optimize("orders", &contents(), &review())
            .await
            .unwrap();

        assert_eq!(outcome.change.new_definition, "");
        assert_eq!(outcome.change.new_metadata, "models: []");
        // Evaluate still ran, fed the empty definition.
        assert_eq!(backend.requests_for("improvement_evaluator").len(), 1);
    }

    #[tokio::test]
    async fn apply_failure_aborts_before_evaluate() {
        let backend = Arc::new(ScriptedBackend::new().with_failure("change_applier", "down"));
        let engine = OptimizationEngine::new(backend.clone());

        let result = engine.optimize("orders", &contents(), &review()).await;

        assert!(matches!(result, Err(EngineError::Generation(_))));
        assert!(backend.requests_for("improvement_evaluator").is_empty());
    }
}
