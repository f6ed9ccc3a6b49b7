//! Generation backend contract
//!
//! A role carries a fixed instruction describing exactly one concern; the
//! backend turns (role, request) into generated text. Fan-out engines hold
//! backends behind `Arc<dyn GenerationBackend>` so the concrete choice is
//! made once, at wiring time.

use crate::error::LlmError;
use async_trait::async_trait;

/// A role-scoped generation target: a name plus a fixed instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    /// Role name, used for labeling fan-out output
    pub name: String,
    /// System instruction describing the role's single concern
    pub instruction: String,
}

impl Role {
    /// Create a role
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instruction: instruction.into(),
        }
    }
}

/// Submit a role-scoped instruction and a request, get text back
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate a response for `request` under `role`'s instruction
    async fn generate(&self, role: &Role, request: &str) -> Result<String, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_construction() {
        let role = Role::new("reviewer", "Review the model.");
        assert_eq!(role.name, "reviewer");
        assert_eq!(role.instruction, "Review the model.");
    }
}
