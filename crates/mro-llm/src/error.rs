//! Error types for generation backends

/// Generation-service errors
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// HTTP transport failed
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend rejected the request or returned a failure payload
    #[error("backend error: {0}")]
    Backend(String),

    /// Backend answered but produced no usable content
    #[error("backend returned no content")]
    EmptyResponse,
}
