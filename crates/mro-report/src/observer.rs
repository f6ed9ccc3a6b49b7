//! Batch-by-batch flushing
//!
//! Implements the scheduler's observer seam so per-artifact documents hit
//! disk as their batch completes. A run that fails in batch N leaves the
//! documents of batches 1..N behind; only the aggregate indices wait for
//! the end of the run.

use crate::generator::ReportGenerator;
use mro_engine::{EngineError, RunContext, RunObserver};

/// Flushes per-artifact documents after every completed batch
#[derive(Debug, Clone)]
pub struct ReportObserver {
    generator: ReportGenerator,
}

impl ReportObserver {
    /// Create an observer writing through the given generator
    #[inline]
    #[must_use]
    pub fn new(generator: ReportGenerator) -> Self {
        Self { generator }
    }
}

impl RunObserver for ReportObserver {
    fn review_batch_completed(
        &mut self,
        ctx: &RunContext,
        names: &[String],
    ) -> Result<(), EngineError> {
        for name in names {
            if let Some(review) = ctx.reviews().get(name) {
                self.generator
                    .write_review_document(review)
                    .map_err(|err| EngineError::Flush(err.to_string()))?;
            }
        }
        Ok(())
    }

    fn optimize_batch_completed(
        &mut self,
        ctx: &RunContext,
        names: &[String],
    ) -> Result<(), EngineError> {
        for name in names {
            if let Some(change) = ctx.changes().get(name) {
                self.generator
                    .write_optimized_bodies(change)
                    .map_err(|err| EngineError::Flush(err.to_string()))?;
            }
            self.generator
                .write_optimization_document(
                    name,
                    ctx.plans().get(name),
                    ctx.evaluations().get(name),
                )
                .map_err(|err| EngineError::Flush(err.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mro_engine::ReviewResult;
    use mro_registry::{Artifact, ArtifactSet};
    use std::fs;

    #[test]
    fn review_batches_flush_documents_incrementally() {
        let dir = tempfile::tempdir().unwrap();
        let generator = ReportGenerator::new(dir.path().join("reviews"), dir.path().join("opt"));
        let mut observer = ReportObserver::new(generator);

        let mut set = ArtifactSet::new("models");
        set.insert(Artifact::new("orders", "orders.sql").with_metadata("schema.yml"));
        let mut ctx = RunContext::new(set);
        ctx.insert_review(ReviewResult {
            artifact_name: "orders".to_string(),
            report_text: "flushed early".to_string(),
            per_perspective_texts: Vec::new(),
        });

        observer
            .review_batch_completed(&ctx, &["orders".to_string()])
            .unwrap();

        let doc = fs::read_to_string(dir.path().join("reviews/orders_review.md")).unwrap();
        assert!(doc.contains("flushed early"));
    }
}
