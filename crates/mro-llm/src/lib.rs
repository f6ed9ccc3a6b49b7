//! MRO LLM - Switchable generation-service backends
//!
//! The orchestration core depends on exactly one contract: submit a
//! role-scoped instruction plus a request, get generated text back.
//! Backend choice is an injected factory, not a core concern:
//! - [`OpenAiBackend`] - OpenAI-compatible chat-completions over HTTP
//! - [`ScriptedBackend`] - deterministic in-memory backend for tests and
//!   offline runs
//!
//! [`ChatClient`] is the single-call conversational path: it decides its
//! fallback capability once at construction. Without a credential a failed
//! call degrades to a deterministic templated response; with one, the
//! failure is re-raised as a typed error.

pub mod backend;
pub mod chat;
pub mod error;
pub mod openai;
pub mod scripted;

pub use backend::{GenerationBackend, Role};
pub use chat::{ChatClient, ChatReply, ChatRole, ChatTurn};
pub use error::LlmError;
pub use openai::{OpenAiBackend, OpenAiConfig};
pub use scripted::ScriptedBackend;
