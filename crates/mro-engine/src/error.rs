//! Error types for the orchestration core
//!
//! Generation failures propagate unhandled through the batch to the run;
//! there is no internal recovery for batch artifacts.

use mro_llm::LlmError;
use mro_registry::RegistryError;

/// Engine errors
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A generation-service call failed during fan-out, consolidation, or
    /// a pipeline stage
    #[error("generation failed: {0}")]
    Generation(#[from] LlmError),

    /// Artifact content could not be loaded
    #[error("artifact load failed: {0}")]
    Load(#[from] RegistryError),

    /// A run observer failed to flush completed results
    #[error("result flush failed: {0}")]
    Flush(String),
}
