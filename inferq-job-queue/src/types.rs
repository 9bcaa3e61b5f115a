//! Core types for the job lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque job identifier, assigned once at submission and never reused.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Generate a fresh identifier.
    #[inline]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Lifecycle state of a job.
///
/// Transitions are one-directional: `Queued -> Running -> {Completed | Failed}`.
/// There is no transition out of a terminal state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobState {
    /// Returns true if this state has no outgoing transition.
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        })
    }
}

/// A record of a submitted unit of work.
///
/// `result` is populated only on entering `Completed`, `error` only on
/// entering `Failed`; the two are mutually exclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub prompt: String,
    pub input: String,
    pub state: JobState,
    pub result: Option<String>,
    pub error: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Create a new queued job.
    #[inline]
    pub fn new(prompt: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            id: JobId::new(),
            prompt: prompt.into(),
            input: input.into(),
            state: JobState::Queued,
            result: None,
            error: None,
            submitted_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Mark the job as running.
    #[inline]
    pub(crate) fn start(&mut self) {
        self.state = JobState::Running;
    }

    /// Mark the job as completed with its result text.
    #[inline]
    pub(crate) fn complete(&mut self, result: impl Into<String>) {
        self.state = JobState::Completed;
        self.result = Some(result.into());
        self.finished_at = Some(Utc::now());
    }

    /// Mark the job as failed with a human-readable description.
    #[inline]
    pub(crate) fn fail(&mut self, error: impl Into<String>) {
        self.state = JobState::Failed;
        self.error = Some(error.into());
        self.finished_at = Some(Utc::now());
    }
}
