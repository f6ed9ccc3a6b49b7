//! MRO Report - Durable run output
//!
//! Sole writer of the output directories. Per artifact: a review
//! document, the rewritten bodies, and an optimization document; per run:
//! two aggregate indices that also enumerate artifacts discovered without
//! documentation, so gaps are visible without re-running discovery.
//!
//! [`ReportObserver`] plugs into the scheduler to flush per-artifact
//! documents batch by batch, which is what makes batches the unit of
//! durability for a failed run.

pub mod error;
pub mod generator;
pub mod observer;

pub use error::ReportError;
pub use generator::ReportGenerator;
pub use observer::ReportObserver;
