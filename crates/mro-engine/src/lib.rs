//! MRO Engine - Review and optimization orchestration core
//!
//! The pipeline this crate drives:
//! - Fan-out/fan-in review: K analyst roles run concurrently over one
//!   artifact, one consolidator merges their findings into a single report
//! - Batch scheduling: fixed-size groups of artifacts reviewed
//!   concurrently, groups strictly sequential, results accumulated in a
//!   run-scoped context
//! - Optimization: plan (fan-out/fan-in again, with rewrite-specialized
//!   roles), apply, extract fenced bodies, evaluate against the original
//!   review
//!
//! All concurrency is cooperative waiting on generation-service calls;
//! file I/O and extraction are synchronous.

#![warn(unreachable_pub)]

pub mod context;
pub mod error;
pub mod evaluation;
pub mod extract;
pub mod fanout;
pub mod optimizer;
pub mod review;
pub mod roles;
pub mod scheduler;
pub mod types;

pub use context::RunContext;
pub use error::EngineError;
pub use fanout::{FanOutReport, ParallelRoles};
pub use optimizer::{OptimizationEngine, OptimizationOutcome};
pub use review::ReviewEngine;
pub use scheduler::{
    BatchScheduler, NoopObserver, RunObserver, SchedulerConfig, OPTIMIZE_BATCH_SIZE,
    REVIEW_BATCH_SIZE,
};
pub use types::{AppliedChange, EvaluationMetrics, OptimizationPlan, ReviewResult};
