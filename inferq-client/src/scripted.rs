//! Scripted inference client for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{InferenceClient, InferenceError};

/// Test double that replays a scripted sequence of outcomes and counts
/// invocations.
///
/// Once the script is exhausted the last outcome repeats, so
/// `always_ok`/`always_rate_limited` can be expressed as single-entry
/// scripts.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    script: Mutex<VecDeque<Result<String, InferenceError>>>,
    last: Mutex<Option<Result<String, InferenceError>>>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    /// Build a client that replays `outcomes` in order.
    pub fn with_script(
        outcomes: impl IntoIterator<Item = Result<String, InferenceError>>,
    ) -> Self {
        Self {
            script: Mutex::new(outcomes.into_iter().collect()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// A client that always succeeds with `result`.
    pub fn always_ok(result: impl Into<String>) -> Self {
        Self::with_script([Ok(result.into())])
    }

    /// A client that always reports a rate-limit condition.
    pub fn always_rate_limited() -> Self {
        Self::with_script([Err(InferenceError::rate_limited("scripted rate limit"))])
    }

    /// A client that always reports a non-retryable provider failure.
    pub fn always_failing(message: impl Into<String>) -> Self {
        Self::with_script([Err(InferenceError::provider(message))])
    }

    /// Number of `generate` invocations observed so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceClient for ScriptedClient {
    async fn generate(&self, _prompt: &str, _input: &str) -> Result<String, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut script = self.script.lock().expect("script lock poisoned");
        if let Some(outcome) = script.pop_front() {
            *self.last.lock().expect("last lock poisoned") = Some(outcome.clone());
            return outcome;
        }
        drop(script);

        self.last
            .lock()
            .expect("last lock poisoned")
            .clone()
            .unwrap_or_else(|| Err(InferenceError::provider("empty script")))
    }
}
