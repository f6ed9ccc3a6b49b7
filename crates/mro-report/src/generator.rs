//! Report generator
//!
//! File layout, mirroring what the pipeline produces:
//! - `<review_dir>/<name>_review.md` - consolidated review per artifact
//! - `<review_dir>/summary.md` - review index with heuristic issue counts
//! - `<optimization_dir>/<name>.sql` / `<name>.yml` - rewritten bodies
//!   (written even when empty; an empty extraction is a valid outcome)
//! - `<optimization_dir>/<name>_optimization.md` - plan plus evaluation
//! - `<optimization_dir>/optimization_summary.md` - optimization index
//!
//! Both indices list artifacts discovered without documentation.

use crate::error::ReportError;
use mro_engine::{AppliedChange, EvaluationMetrics, OptimizationPlan, ReviewResult, RunContext};
use mro_registry::ArtifactSet;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Flag words the issue-count heuristic looks for
///
/// An approximation over the consolidated text, not a structured count.
const ISSUE_MARKERS: [&str; 3] = ["issue", "missing", "inconsistent"];

/// Writes run results to the two output directories
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    review_dir: PathBuf,
    optimization_dir: PathBuf,
}

impl ReportGenerator {
    /// Create a generator over the two output roots
    #[inline]
    #[must_use]
    pub fn new(review_dir: impl Into<PathBuf>, optimization_dir: impl Into<PathBuf>) -> Self {
        Self {
            review_dir: review_dir.into(),
            optimization_dir: optimization_dir.into(),
        }
    }

    /// Review output root
    #[inline]
    #[must_use]
    pub fn review_dir(&self) -> &Path {
        &self.review_dir
    }

    /// Optimization output root
    #[inline]
    #[must_use]
    pub fn optimization_dir(&self) -> &Path {
        &self.optimization_dir
    }

    /// Persist everything a completed run accumulated
    ///
    /// # Errors
    /// The first filesystem failure aborts persistence.
    pub fn write_run(&self, ctx: &RunContext) -> Result<(), ReportError> {
        for review in ctx.reviews().values() {
            self.write_review_document(review)?;
        }
        self.write_review_summary(ctx)?;

        if !ctx.changes().is_empty() {
            for change in ctx.changes().values() {
                self.write_optimized_bodies(change)?;
                let plan = ctx.plans().get(&change.artifact_name);
                let metrics = ctx.evaluations().get(&change.artifact_name);
                self.write_optimization_document(&change.artifact_name, plan, metrics)?;
            }
            self.write_optimization_summary(ctx)?;
        }

        tracing::info!(
            review_dir = %self.review_dir.display(),
            optimization_dir = %self.optimization_dir.display(),
            reviews = ctx.reviews().len(),
            optimizations = ctx.changes().len(),
            "run reports written"
        );

        Ok(())
    }

    /// Write one artifact's review document
    ///
    /// # Errors
    /// Filesystem failures only.
    pub fn write_review_document(&self, review: &ReviewResult) -> Result<PathBuf, ReportError> {
        let path = self
            .review_dir
            .join(format!("{}_review.md", review.artifact_name));
        let document = format!(
            "# Model Review: {}\n\n{}\n",
            review.artifact_name, review.report_text
        );
        self.write_file(&path, &document)?;
        Ok(path)
    }

    /// Write the aggregate review index
    ///
    /// # Errors
    /// Filesystem failures only.
    pub fn write_review_summary(&self, ctx: &RunContext) -> Result<PathBuf, ReportError> {
        let mut summary = String::from("# Model Review Summary\n\n");
        let _ = writeln!(
            summary,
            "Source directory: {}",
            ctx.artifacts().root().display()
        );
        let _ = writeln!(summary, "Models reviewed: {}\n", ctx.reviews().len());

        write_missing_docs_section(&mut summary, ctx.artifacts());

        let _ = writeln!(summary, "## Review Index\n");
        let _ = writeln!(summary, "| Model | Issues | Review file |");
        let _ = writeln!(summary, "|---|---|---|");
        for review in ctx.reviews().values() {
            let _ = writeln!(
                summary,
                "| {} | {} | {}_review.md |",
                review.artifact_name,
                heuristic_issue_count(&review.report_text),
                review.artifact_name
            );
        }

        let path = self.review_dir.join("summary.md");
        self.write_file(&path, &summary)?;
        Ok(path)
    }

    /// Write one artifact's rewritten bodies
    ///
    /// Empty bodies produce empty files rather than being skipped, so the
    /// output directory always reflects what extraction recovered.
    ///
    /// # Errors
    /// Filesystem failures only.
    pub fn write_optimized_bodies(&self, change: &AppliedChange) -> Result<(), ReportError> {
        let sql_path = self
            .optimization_dir
            .join(format!("{}.sql", change.artifact_name));
        self.write_file(&sql_path, &change.new_definition)?;

        let yml_path = self
            .optimization_dir
            .join(format!("{}.yml", change.artifact_name));
        self.write_file(&yml_path, &change.new_metadata)?;

        Ok(())
    }

    /// Write one artifact's optimization document (plan plus evaluation)
    ///
    /// # Errors
    /// Filesystem failures only.
    pub fn write_optimization_document(
        &self,
        artifact_name: &str,
        plan: Option<&OptimizationPlan>,
        metrics: Option<&EvaluationMetrics>,
    ) -> Result<PathBuf, ReportError> {
        let mut document = format!("# Optimization Report: {artifact_name}\n\n");

        let _ = writeln!(document, "## Optimization Plan\n");
        let _ = writeln!(
            document,
            "{}\n",
            plan.map_or("(no plan recorded)", |plan| plan.plan_text.as_str())
        );

        let _ = writeln!(document, "## Evaluation\n");
        match metrics {
            Some(metrics) => {
                let _ = writeln!(document, "{}\n", metrics.evaluation_text);
                write_metrics_section(&mut document, metrics);
            }
            None => {
                let _ = writeln!(document, "(no evaluation recorded)\n");
            }
        }

        let path = self
            .optimization_dir
            .join(format!("{artifact_name}_optimization.md"));
        self.write_file(&path, &document)?;
        Ok(path)
    }

    /// Write the aggregate optimization index
    ///
    /// # Errors
    /// Filesystem failures only.
    pub fn write_optimization_summary(&self, ctx: &RunContext) -> Result<PathBuf, ReportError> {
        let mut summary = String::from("# Model Optimization Summary\n\n");
        let _ = writeln!(summary, "Models optimized: {}\n", ctx.changes().len());

        write_missing_docs_section(&mut summary, ctx.artifacts());

        let _ = writeln!(summary, "## Optimizations\n");
        for change in ctx.changes().values() {
            let name = &change.artifact_name;
            let _ = writeln!(summary, "### {name}\n");
            let _ = writeln!(summary, "- [Optimization Report]({name}_optimization.md)");
            let _ = writeln!(summary, "- [Optimized SQL]({name}.sql)");
            let _ = writeln!(summary, "- [Optimized YAML]({name}.yml)\n");
        }

        let path = self.optimization_dir.join("optimization_summary.md");
        self.write_file(&path, &summary)?;
        Ok(path)
    }

    fn write_file(&self, path: &Path, contents: &str) -> Result<(), ReportError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ReportError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, contents).map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Count flag-word occurrences in a consolidated report
fn heuristic_issue_count(report_text: &str) -> usize {
    let lower = report_text.to_lowercase();
    ISSUE_MARKERS
        .iter()
        .map(|marker| lower.matches(marker).count())
        .sum()
}

fn write_missing_docs_section(summary: &mut String, artifacts: &ArtifactSet) {
    if artifacts.unpaired().is_empty() {
        return;
    }
    let _ = writeln!(summary, "## Models Missing Documentation\n");
    for artifact in artifacts.missing_metadata() {
        let _ = writeln!(
            summary,
            "- {} (definition: {})",
            artifact.name(),
            artifact.definition_path().display()
        );
    }
    let _ = writeln!(summary);
}

fn write_metrics_section(document: &mut String, metrics: &EvaluationMetrics) {
    let has_fields = metrics.resolution_percentage.is_some()
        || metrics.overall_score.is_some()
        || !metrics.resolved_issues.is_empty()
        || !metrics.new_issues.is_empty();
    if !has_fields {
        return;
    }

    let _ = writeln!(document, "## Parsed Metrics\n");
    if let Some(percentage) = metrics.resolution_percentage {
        let _ = writeln!(document, "- Resolution percentage: {percentage}%");
    }
    if let Some(score) = metrics.overall_score {
        let _ = writeln!(document, "- Overall score: {score}/100");
    }
    if !metrics.resolved_issues.is_empty() {
        let _ = writeln!(
            document,
            "- Resolved issues listed: {}",
            metrics.resolved_issues.len()
        );
    }
    if !metrics.new_issues.is_empty() {
        let _ = writeln!(
            document,
            "- New issues listed: {}",
            metrics.new_issues.len()
        );
    }
    let _ = writeln!(document);
}
