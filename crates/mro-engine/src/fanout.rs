//! Fan-out/fan-in over a panel of roles
//!
//! Scatter one request to K analyst roles concurrently, gather their
//! results back into declaration order, then feed everything to one
//! consolidator role. The join is all-or-nothing: a single failed analyst
//! fails the whole run for that request.

use crate::error::EngineError;
use futures::future;
use mro_llm::{GenerationBackend, Role};
use std::fmt::Write as _;
use std::sync::Arc;

/// Output of one fan-out/fan-in pass
#[derive(Debug, Clone)]
pub struct FanOutReport {
    /// One text per analyst, in declaration order
    pub perspectives: Vec<String>,
    /// The consolidator's merged report
    pub consolidated: String,
}

/// A fixed panel of analyst roles plus a consolidator
pub struct ParallelRoles {
    backend: Arc<dyn GenerationBackend>,
    analysts: Vec<Role>,
    consolidator: Role,
}

impl ParallelRoles {
    /// Create a panel
    #[inline]
    #[must_use]
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        analysts: Vec<Role>,
        consolidator: Role,
    ) -> Self {
        Self {
            backend,
            analysts,
            consolidator,
        }
    }

    /// Analyst roles in declaration order
    #[inline]
    #[must_use]
    pub fn analysts(&self) -> &[Role] {
        &self.analysts
    }

    /// Run the panel over one request
    ///
    /// All analyst calls are issued together; `try_join_all` restores
    /// declaration order before consolidation, so completion order never
    /// leaks into the output. The consolidator receives every perspective
    /// labeled by position and role name, plus the original request.
    ///
    /// # Errors
    /// The first analyst or consolidator failure aborts the pass.
    pub async fn run(&self, request: &str) -> Result<FanOutReport, EngineError> {
        let fan_out = self.analysts.iter().map(|role| {
            let backend = Arc::clone(&self.backend);
            async move { backend.generate(role, request).await }
        });

        let perspectives = future::try_join_all(fan_out).await?;
        tracing::debug!(
            analysts = self.analysts.len(),
            consolidator = %self.consolidator.name,
            "fan-out complete; consolidating"
        );

        let fan_in = fan_in_request(&self.analysts, &perspectives, request);
        let consolidated = self.backend.generate(&self.consolidator, &fan_in).await?;

        Ok(FanOutReport {
            perspectives,
            consolidated,
        })
    }
}

/// Assemble the consolidator request from positionally ordered perspectives
fn fan_in_request(analysts: &[Role], perspectives: &[String], request: &str) -> String {
    let mut text = String::from("Specialist findings to consolidate:\n\n");
    for (index, (role, perspective)) in analysts.iter().zip(perspectives).enumerate() {
        let _ = writeln!(
            text,
            "### Perspective {}: {}\n{}\n",
            index + 1,
            role.name,
            perspective
        );
    }
    let _ = write!(text, "### Original request\n{request}");
    text
}
