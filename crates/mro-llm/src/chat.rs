//! Single-call chat path
//!
//! The conversational front end makes exactly one backend call per user
//! message. Its failure policy is a capability decided once, at
//! construction: a client built without a credential substitutes a
//! deterministic templated response when the call fails, while a
//! credentialed client re-raises the typed error - a real deployment must
//! not mask real failures behind demo content.

use crate::backend::{GenerationBackend, Role};
use crate::error::LlmError;
use std::fmt::Write as _;
use std::sync::Arc;

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    /// The human side of the conversation
    User,
    /// The generated side of the conversation
    Assistant,
}

impl ChatRole {
    /// Transcript label
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// One turn of conversation history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    /// Who spoke
    pub role: ChatRole,
    /// What was said
    pub content: String,
}

impl ChatTurn {
    /// A user turn
    #[inline]
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// An assistant turn
    #[inline]
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Response plus the updated conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    /// Generated (or fallback) response text
    pub response: String,
    /// History with the new user and assistant turns appended
    pub conversation: Vec<ChatTurn>,
}

/// Single-call conversational client
pub struct ChatClient {
    backend: Arc<dyn GenerationBackend>,
    persona: Role,
    has_credential: bool,
}

impl ChatClient {
    /// Create a client
    ///
    /// `has_credential` fixes the fallback capability for the client's
    /// lifetime; it is never re-derived per call.
    #[inline]
    #[must_use]
    pub fn new(backend: Arc<dyn GenerationBackend>, persona: Role, has_credential: bool) -> Self {
        Self {
            backend,
            persona,
            has_credential,
        }
    }

    /// Whether this client was constructed with a credential
    #[inline]
    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.has_credential
    }

    /// Respond to one user message in the context of `history`
    ///
    /// # Errors
    /// Re-raises the backend error only for credentialed clients; without a
    /// credential the error degrades to the templated fallback response.
    pub async fn respond(
        &self,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<ChatReply, LlmError> {
        let request = render_request(history, message);

        let response = match self.backend.generate(&self.persona, &request).await {
            Ok(text) => text,
            Err(err) if !self.has_credential => {
                tracing::warn!(error = %err, "no credential configured; serving fallback response");
                fallback_response(message)
            }
            Err(err) => return Err(err),
        };

        let mut conversation = history.to_vec();
        conversation.push(ChatTurn::user(message));
        conversation.push(ChatTurn::assistant(response.clone()));

        Ok(ChatReply {
            response,
            conversation,
        })
    }
}

/// Flatten history plus the new message into one request transcript
fn render_request(history: &[ChatTurn], message: &str) -> String {
    let mut request = String::new();
    for turn in history {
        let _ = writeln!(request, "{}: {}", turn.role.as_str(), turn.content);
    }
    let _ = write!(request, "user: {message}");
    request
}

/// Deterministic response used when no credential is configured
fn fallback_response(message: &str) -> String {
    format!(
        "[offline preview] No generation credential is configured, so this is a canned \
         response rather than a generated one. Your message was: \"{message}\". Configure \
         an API key to enable live responses."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedBackend;

    fn persona() -> Role {
        Role::new("assistant", "You answer questions about model reviews.")
    }

    #[tokio::test]
    async fn respond_appends_both_turns() {
        let backend = Arc::new(ScriptedBackend::new().with_response("assistant", "hello"));
        let client = ChatClient::new(backend, persona(), true);

        let history = vec![ChatTurn::user("hi"), ChatTurn::assistant("hi there")];
        let reply = client.respond(&history, "how are you").await.unwrap();

        assert_eq!(reply.response, "hello");
        assert_eq!(reply.conversation.len(), 4);
        assert_eq!(reply.conversation[2], ChatTurn::user("how are you"));
        assert_eq!(reply.conversation[3], ChatTurn::assistant("hello"));
    }

    #[tokio::test]
    async fn failure_without_credential_falls_back() {
        let backend = Arc::new(ScriptedBackend::new().with_failure("assistant", "boom"));
        let client = ChatClient::new(backend, persona(), false);

        let reply = client.respond(&[], "what broke").await.unwrap();

        assert!(reply.response.contains("offline preview"));
        assert!(reply.response.contains("what broke"));
    }

    #[tokio::test]
    async fn failure_with_credential_is_raised() {
        let backend = Arc::new(ScriptedBackend::new().with_failure("assistant", "boom"));
        let client = ChatClient::new(backend, persona(), true);

        let err = client.respond(&[], "what broke").await.unwrap_err();
        assert!(matches!(err, LlmError::Backend(message) if message == "boom"));
    }

    #[test]
    fn request_renders_full_transcript() {
        let history = vec![ChatTurn::user("first"), ChatTurn::assistant("second")];
        let request = render_request(&history, "third");

        assert!(request.contains("user: first"));
        assert!(request.contains("assistant: second"));
        assert!(request.ends_with("user: third"));
    }
}
