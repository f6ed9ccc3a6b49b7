//! Scripted in-memory backend
//!
//! Deterministic stand-in for a real generation service: tests script
//! per-role responses, failures, and completion delays, and can observe
//! call ordering and peak concurrency. Unscripted roles get a labeled
//! default response so orchestration paths stay exercisable without any
//! scripting at all.

use crate::backend::{GenerationBackend, Role};
use crate::error::LlmError;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug)]
enum Script {
    /// Same text for every call
    Respond(String),
    /// One queued text per call; exhaustion is a backend error
    Queue(VecDeque<String>),
    /// Every call fails
    Fail(String),
}

/// Deterministic scripted backend
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    scripts: Mutex<HashMap<String, Script>>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<(String, String)>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedBackend {
    /// Backend with no scripts; every role gets the default response
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a fixed response for a role
    #[must_use]
    pub fn with_response(self, role_name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert_script(role_name.into(), Script::Respond(text.into()));
        self
    }

    /// Script a queue of responses for a role, consumed one per call
    #[must_use]
    pub fn with_responses<I, S>(self, role_name: impl Into<String>, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue = texts.into_iter().map(Into::into).collect();
        self.insert_script(role_name.into(), Script::Queue(queue));
        self
    }

    /// Script every call for a role to fail
    #[must_use]
    pub fn with_failure(self, role_name: impl Into<String>, message: impl Into<String>) -> Self {
        self.insert_script(role_name.into(), Script::Fail(message.into()));
        self
    }

    /// Delay a role's completion, to simulate completion-order jitter
    #[must_use]
    pub fn with_delay(mut self, role_name: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(role_name.into(), delay);
        self
    }

    /// Role names in the order calls completed
    #[must_use]
    pub fn completed_calls(&self) -> Vec<String> {
        self.lock_calls()
            .iter()
            .map(|(role, _)| role.clone())
            .collect()
    }

    /// Request payloads a role has received, in completion order
    #[must_use]
    pub fn requests_for(&self, role_name: &str) -> Vec<String> {
        self.lock_calls()
            .iter()
            .filter(|(role, _)| role == role_name)
            .map(|(_, request)| request.clone())
            .collect()
    }

    /// Total number of completed calls
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.lock_calls().len()
    }

    /// Highest number of calls observed in flight at once
    #[must_use]
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn insert_script(&self, role_name: String, script: Script) {
        self.lock_scripts().insert(role_name, script);
    }

    fn lock_scripts(&self) -> std::sync::MutexGuard<'_, HashMap<String, Script>> {
        self.scripts.lock().expect("scripted backend lock poisoned")
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<(String, String)>> {
        self.calls.lock().expect("scripted backend lock poisoned")
    }

    fn next_response(&self, role: &Role) -> Result<String, LlmError> {
        let mut scripts = self.lock_scripts();
        match scripts.get_mut(&role.name) {
            Some(Script::Respond(text)) => Ok(text.clone()),
            Some(Script::Queue(queue)) => queue.pop_front().ok_or_else(|| {
                LlmError::Backend(format!("script exhausted for role {}", role.name))
            }),
            Some(Script::Fail(message)) => Err(LlmError::Backend(message.clone())),
            None => Ok(format!("[{}] ok", role.name)),
        }
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate(&self, role: &Role, request: &str) -> Result<String, LlmError> {
        let entered = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(entered, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(&role.name) {
            tokio::time::sleep(*delay).await;
        }

        let result = self.next_response(role);

        self.lock_calls()
            .push((role.name.clone(), request.to_string()));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        result
    }
}
