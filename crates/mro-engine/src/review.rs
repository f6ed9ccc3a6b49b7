//! Review engine
//!
//! Wraps the fan-out/fan-in panel with the review role set. Pure with
//! respect to its inputs: the only side effects are the generation calls.

use crate::error::EngineError;
use crate::fanout::ParallelRoles;
use crate::roles;
use crate::types::ReviewResult;
use mro_llm::GenerationBackend;
use mro_registry::ArtifactContents;
use std::sync::Arc;

/// Multi-perspective reviewer for one artifact at a time
pub struct ReviewEngine {
    panel: ParallelRoles,
}

impl ReviewEngine {
    /// Create a review engine over the given backend
    #[must_use]
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            panel: ParallelRoles::new(
                backend,
                roles::review_analysts(),
                roles::review_consolidator(),
            ),
        }
    }

    /// Review one artifact's loaded contents
    ///
    /// # Errors
    /// Any analyst or consolidator failure aborts the review.
    pub async fn review(
        &self,
        name: &str,
        contents: &ArtifactContents,
    ) -> Result<ReviewResult, EngineError> {
        let request = roles::review_request(name, &contents.definition, &contents.metadata);
        let report = self.panel.run(&request).await?;

        Ok(ReviewResult {
            artifact_name: name.to_string(),
            report_text: report.consolidated,
            per_perspective_texts: report.perspectives,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mro_llm::ScriptedBackend;

    #[tokio::test]
    async fn review_collects_one_text_per_analyst() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .with_response("field_consistency_checker", "columns fine")
                .with_response("config_strategy_reviewer", "config fine")
                .with_response("field_descriptions_reviewer", "descriptions thin")
                .with_response("model_description_reviewer", "purpose unclear")
                .with_response("review_consolidator", "the merged report"),
        );
        let engine = ReviewEngine::new(backend);

        let contents = ArtifactContents {
            definition: "select 1 as id".to_string(),
            metadata: "models:\n  - name: orders".to_string(),
        };
        let review = engine.review("orders", &contents).await.unwrap();

        assert_eq!(review.artifact_name, "orders");
        assert_eq!(review.report_text, "the merged report");
        assert_eq!(
            review.per_perspective_texts,
            vec![
                "columns fine",
                "config fine",
                "descriptions thin",
                "purpose unclear"
            ]
        );
    }
}
