//! Batch scheduler
//!
//! Drives the review and optimization engines over a whole artifact set
//! with bounded concurrency: artifacts are partitioned into fixed-size
//! batches, batches run strictly sequentially, and every member of a
//! batch runs concurrently. The scheduler only advances once the entire
//! batch has resolved, so one slow artifact delays the batch but peak
//! generation-service load never exceeds one batch's width.
//!
//! Batches are also the unit of durability: after each merged batch the
//! run observer gets a chance to flush, so a failed run keeps everything
//! earlier batches flushed.

use crate::context::RunContext;
use crate::error::EngineError;
use crate::optimizer::OptimizationEngine;
use crate::review::ReviewEngine;
use crate::types::ReviewResult;
use futures::future;
use mro_llm::GenerationBackend;
use mro_registry::Artifact;
use std::sync::Arc;

/// Default batch width for the review phase
pub const REVIEW_BATCH_SIZE: usize = 5;

/// Default batch width for the optimization phase; smaller because each
/// artifact costs several generation calls more than a review does
pub const OPTIMIZE_BATCH_SIZE: usize = 3;

/// Scheduler tuning
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// Artifacts reviewed concurrently per batch
    pub review_batch_size: usize,
    /// Artifacts optimized concurrently per batch
    pub optimize_batch_size: usize,
}

impl SchedulerConfig {
    /// Default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a review batch width
    #[inline]
    #[must_use]
    pub fn with_review_batch_size(mut self, size: usize) -> Self {
        self.review_batch_size = size.max(1);
        self
    }

    /// With an optimization batch width
    #[inline]
    #[must_use]
    pub fn with_optimize_batch_size(mut self, size: usize) -> Self {
        self.optimize_batch_size = size.max(1);
        self
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            review_batch_size: REVIEW_BATCH_SIZE,
            optimize_batch_size: OPTIMIZE_BATCH_SIZE,
        }
    }
}

/// Receives completed batches for durable flushing
///
/// Both hooks default to no-ops so observers can care about one phase
/// only.
pub trait RunObserver {
    /// Called after a review batch is merged into the context
    ///
    /// # Errors
    /// An observer failure aborts the run like a failed batch would.
    fn review_batch_completed(
        &mut self,
        _ctx: &RunContext,
        _names: &[String],
    ) -> Result<(), EngineError> {
        Ok(())
    }

    /// Called after an optimization batch is merged into the context
    ///
    /// # Errors
    /// An observer failure aborts the run like a failed batch would.
    fn optimize_batch_completed(
        &mut self,
        _ctx: &RunContext,
        _names: &[String],
    ) -> Result<(), EngineError> {
        Ok(())
    }
}

/// Observer that flushes nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

/// Batch-driven front end over the review and optimization engines
pub struct BatchScheduler {
    reviewer: ReviewEngine,
    optimizer: OptimizationEngine,
    config: SchedulerConfig,
}

impl BatchScheduler {
    /// Scheduler with default batch widths
    #[must_use]
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self::with_config(backend, SchedulerConfig::default())
    }

    /// Scheduler with explicit tuning
    #[must_use]
    pub fn with_config(backend: Arc<dyn GenerationBackend>, config: SchedulerConfig) -> Self {
        Self {
            reviewer: ReviewEngine::new(Arc::clone(&backend)),
            optimizer: OptimizationEngine::new(backend),
            config,
        }
    }

    /// Review every paired artifact in the context's set
    ///
    /// Unpaired artifacts are never reviewed; they surface only in
    /// reports. Results overwrite by name, so re-running over an
    /// unchanged set replaces rather than accumulates.
    ///
    /// # Errors
    /// The first failed artifact fails its batch and aborts the run;
    /// earlier batches stay merged (and flushed, if the observer did).
    pub async fn review_all(
        &self,
        ctx: &mut RunContext,
        observer: &mut dyn RunObserver,
    ) -> Result<(), EngineError> {
        let artifacts: Vec<Artifact> = ctx.artifacts().paired().values().cloned().collect();
        let total = artifacts.len();
        if total == 0 {
            tracing::info!("no paired artifacts to review");
            return Ok(());
        }

        tracing::info!(
            total,
            batch_size = self.config.review_batch_size,
            "starting review run"
        );

        let mut done = 0usize;
        for batch in artifacts.chunks(self.config.review_batch_size) {
            let reviews = future::try_join_all(
                batch.iter().map(|artifact| self.review_artifact(artifact)),
            )
            .await?;

            let mut names = Vec::with_capacity(reviews.len());
            for review in reviews {
                done += 1;
                tracing::info!(artifact = %review.artifact_name, done, total, "review completed");
                names.push(review.artifact_name.clone());
                ctx.insert_review(review);
            }
            observer.review_batch_completed(ctx, &names)?;
        }

        Ok(())
    }

    /// Optimize every artifact that has a review in the context
    ///
    /// # Errors
    /// Same failure policy as [`Self::review_all`].
    pub async fn optimize_all(
        &self,
        ctx: &mut RunContext,
        observer: &mut dyn RunObserver,
    ) -> Result<(), EngineError> {
        let targets: Vec<(Artifact, ReviewResult)> = ctx
            .artifacts()
            .paired()
            .values()
            .filter_map(|artifact| {
                ctx.review_for(artifact.name())
                    .map(|review| (artifact.clone(), review.clone()))
            })
            .collect();

        let total = targets.len();
        if total == 0 {
            tracing::info!("no reviewed artifacts to optimize");
            return Ok(());
        }

        tracing::info!(
            total,
            batch_size = self.config.optimize_batch_size,
            "starting optimization run"
        );

        let mut done = 0usize;
        for batch in targets.chunks(self.config.optimize_batch_size) {
            let outcomes = future::try_join_all(
                batch
                    .iter()
                    .map(|(artifact, review)| self.optimize_artifact(artifact, review)),
            )
            .await?;

            let mut names = Vec::with_capacity(outcomes.len());
            for outcome in outcomes {
                done += 1;
                tracing::info!(artifact = %outcome.change.artifact_name, done, total, "optimization completed");
                names.push(outcome.change.artifact_name.clone());
                ctx.insert_outcome(outcome);
            }
            observer.optimize_batch_completed(ctx, &names)?;
        }

        Ok(())
    }

    async fn review_artifact(&self, artifact: &Artifact) -> Result<ReviewResult, EngineError> {
        let contents = artifact.read_contents()?;
        self.reviewer.review(artifact.name(), &contents).await
    }

    async fn optimize_artifact(
        &self,
        artifact: &Artifact,
        review: &ReviewResult,
    ) -> Result<crate::optimizer::OptimizationOutcome, EngineError> {
        let contents = artifact.read_contents()?;
        self.optimizer
            .optimize(artifact.name(), &contents, review)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles;
    use mro_llm::ScriptedBackend;
    use mro_registry::ArtifactSet;
    use std::fs;
    use std::path::Path;
    use std::time::Duration;

    const APPLY_OUTPUT: &str = "```sql\nselect 1\n```\n```yaml\nmodels: []\n```";

    #[derive(Debug, Default)]
    struct RecordingObserver {
        review_batches: Vec<Vec<String>>,
        optimize_batches: Vec<Vec<String>>,
    }

    impl RunObserver for RecordingObserver {
        fn review_batch_completed(
            &mut self,
            _ctx: &RunContext,
            names: &[String],
        ) -> Result<(), EngineError> {
            self.review_batches.push(names.to_vec());
            Ok(())
        }

        fn optimize_batch_completed(
            &mut self,
            _ctx: &RunContext,
            names: &[String],
        ) -> Result<(), EngineError> {
            self.optimize_batches.push(names.to_vec());
            Ok(())
        }
    }

    fn paired_artifact(dir: &Path, name: &str) -> Artifact {
        let sql = dir.join(format!("{name}.sql"));
        let yml = dir.join(format!("{name}.yml"));
        fs::write(&sql, format!("select 1 as {name}_id")).unwrap();
        fs::write(&yml, format!("models:\n  - name: {name}")).unwrap();
        Artifact::new(name, sql).with_metadata(yml)
    }

    fn fixture(dir: &Path, count: usize) -> RunContext {
        let mut set = ArtifactSet::new(dir);
        for index in 0..count {
            set.insert(paired_artifact(dir, &format!("model_{index}")));
        }
        RunContext::new(set)
    }

    #[tokio::test]
    async fn batches_follow_the_ceiling_rule() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = fixture(dir.path(), 7);
        let backend = Arc::new(ScriptedBackend::new());
        let scheduler = BatchScheduler::with_config(
            backend,
            SchedulerConfig::new().with_review_batch_size(3),
        );
        let mut observer = RecordingObserver::default();

        scheduler.review_all(&mut ctx, &mut observer).await.unwrap();

        let sizes: Vec<usize> = observer.review_batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        assert_eq!(ctx.reviews().len(), 7);
    }

    #[tokio::test]
    async fn in_flight_calls_stay_within_one_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = fixture(dir.path(), 7);

        // Delay every analyst so all members of a batch overlap fully.
        let mut backend = ScriptedBackend::new();
        for role in roles::review_analysts() {
            backend = backend.with_delay(role.name, Duration::from_millis(20));
        }
        let backend = Arc::new(backend);

        let batch = 3;
        let scheduler = BatchScheduler::with_config(
            Arc::clone(&backend) as Arc<dyn GenerationBackend>,
            SchedulerConfig::new().with_review_batch_size(batch),
        );

        scheduler
            .review_all(&mut ctx, &mut NoopObserver)
            .await
            .unwrap();

        // 4 analysts + 1 consolidator per artifact; with 7 artifacts an
        // unbatched run could reach 28 concurrent analyst calls.
        let per_artifact_width = roles::review_analysts().len() + 1;
        assert!(backend.peak_in_flight() <= batch * per_artifact_width);
    }

    #[tokio::test]
    async fn rerun_overwrites_instead_of_accumulating() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = fixture(dir.path(), 4);
        let backend = Arc::new(ScriptedBackend::new());
        let scheduler = BatchScheduler::new(backend);

        scheduler
            .review_all(&mut ctx, &mut NoopObserver)
            .await
            .unwrap();
        scheduler
            .review_all(&mut ctx, &mut NoopObserver)
            .await
            .unwrap();

        assert_eq!(ctx.reviews().len(), 4);
    }

    #[tokio::test]
    async fn unpaired_artifacts_are_never_reviewed() {
        let dir = tempfile::tempdir().unwrap();
        let mut set = ArtifactSet::new(dir.path());
        set.insert(paired_artifact(dir.path(), "documented"));
        // No file behind this one: touching it would fail the run.
        set.insert(Artifact::new("undocumented", dir.path().join("undocumented.sql")));
        let mut ctx = RunContext::new(set);

        let scheduler = BatchScheduler::new(Arc::new(ScriptedBackend::new()));
        scheduler
            .review_all(&mut ctx, &mut NoopObserver)
            .await
            .unwrap();

        assert_eq!(ctx.reviews().len(), 1);
        assert!(ctx.review_for("documented").is_some());
        assert!(ctx.review_for("undocumented").is_none());
    }

    #[tokio::test]
    async fn failed_batch_aborts_and_keeps_earlier_batches() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = fixture(dir.path(), 5);

        // Enough scripted responses for the first batch only; the fourth
        // call exhausts the queue and fails the second batch.
        let backend = Arc::new(ScriptedBackend::new().with_responses(
            "field_consistency_checker",
            ["ok", "ok", "ok"],
        ));
        let scheduler = BatchScheduler::with_config(
            backend,
            SchedulerConfig::new().with_review_batch_size(3),
        );
        let mut observer = RecordingObserver::default();

        let result = scheduler.review_all(&mut ctx, &mut observer).await;

        assert!(matches!(result, Err(EngineError::Generation(_))));
        assert_eq!(ctx.reviews().len(), 3);
        assert_eq!(observer.review_batches.len(), 1);
    }

    #[tokio::test]
    async fn optimize_covers_only_reviewed_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = fixture(dir.path(), 3);
        let backend = Arc::new(
            ScriptedBackend::new().with_response("change_applier", APPLY_OUTPUT),
        );
        let scheduler = BatchScheduler::with_config(
            backend,
            SchedulerConfig::new().with_optimize_batch_size(2),
        );

        // Only two of the three artifacts were reviewed.
        ctx.insert_review(ReviewResult {
            artifact_name: "model_0".to_string(),
            report_text: "r".to_string(),
            per_perspective_texts: Vec::new(),
        });
        ctx.insert_review(ReviewResult {
            artifact_name: "model_2".to_string(),
            report_text: "r".to_string(),
            per_perspective_texts: Vec::new(),
        });

        let mut observer = RecordingObserver::default();
        scheduler
            .optimize_all(&mut ctx, &mut observer)
            .await
            .unwrap();

        let sizes: Vec<usize> = observer.optimize_batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2]);
        assert!(ctx.changes().contains_key("model_0"));
        assert!(ctx.changes().contains_key("model_2"));
        assert!(!ctx.changes().contains_key("model_1"));
        assert_eq!(ctx.plans().len(), 2);
        assert_eq!(ctx.evaluations().len(), 2);
    }
}
