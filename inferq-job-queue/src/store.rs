//! In-memory job store implementation.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use crate::error::JobQueueError;
use crate::types::{Job, JobId};

/// Maximum number of job records to keep in memory.
const MAX_RETAINED_JOBS: usize = 10_000;

/// Internal storage optimized for both iteration and lookup by ID.
#[derive(Debug, Default)]
struct StoreState {
    /// Ordered list of job IDs (oldest first).
    order: VecDeque<JobId>,
    /// Map from ID to job record for O(1) lookup.
    jobs: HashMap<JobId, Job>,
}

impl StoreState {
    /// Insert a new job record, maintaining the retention cap.
    ///
    /// Only terminal records are eligible for trimming; an in-flight job
    /// must never lose its store entry.
    fn insert(&mut self, job: Job) {
        let id = job.id;
        self.jobs.insert(id, job);
        self.order.push_back(id);

        while self.order.len() > MAX_RETAINED_JOBS {
            let Some(pos) = self
                .order
                .iter()
                .position(|id| self.jobs.get(id).map_or(true, |j| j.state.is_terminal()))
            else {
                break;
            };
            if let Some(old_id) = self.order.remove(pos) {
                self.jobs.remove(&old_id);
            }
        }
    }

    #[inline]
    fn get(&self, id: &JobId) -> Option<&Job> {
        self.jobs.get(id)
    }

    #[inline]
    fn get_mut(&mut self, id: &JobId) -> Option<&mut Job> {
        self.jobs.get_mut(id)
    }

    /// Iterate over all records in reverse order (most recent first).
    fn iter_recent(&self) -> impl Iterator<Item = &Job> {
        self.order.iter().rev().filter_map(|id| self.jobs.get(id))
    }
}

/// Durable owner of every job's lifecycle state, from creation to terminal
/// state.
///
/// Readers may poll concurrently with worker writes; a transition is a single
/// write under the lock, so a poller observes either the pre- or the
/// post-transition record, never a torn one. Transitions out of a terminal
/// state are rejected, which keeps observed state sequences monotonic and
/// makes duplicate delivery of the same job harmless.
#[derive(Clone, Default)]
pub struct JobStore {
    state: Arc<RwLock<StoreState>>,
}

impl fmt::Debug for JobStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobStore")
            .field("state", &"<RwLock<StoreState>>")
            .finish()
    }
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new job record in the `Queued` state and return it.
    pub async fn create(
        &self,
        prompt: impl Into<String>,
        input: impl Into<String>,
    ) -> Job {
        let job = Job::new(prompt, input);
        let mut state = self.state.write().await;
        state.insert(job.clone());
        job
    }

    /// Look up a job record by ID.
    pub async fn get(&self, id: JobId) -> Option<Job> {
        let state = self.state.read().await;
        state.get(&id).cloned()
    }

    /// Transition a job to `Running`.
    pub async fn mark_running(&self, id: JobId) -> Result<Job, JobQueueError> {
        self.transition(id, |job| job.start()).await
    }

    /// Transition a job to `Completed` with its result text.
    pub async fn mark_completed(
        &self,
        id: JobId,
        result: impl Into<String>,
    ) -> Result<Job, JobQueueError> {
        let result = result.into();
        self.transition(id, move |job| job.complete(result)).await
    }

    /// Transition a job to `Failed` with a human-readable description.
    pub async fn mark_failed(
        &self,
        id: JobId,
        error: impl Into<String>,
    ) -> Result<Job, JobQueueError> {
        let error = error.into();
        self.transition(id, move |job| job.fail(error)).await
    }

    async fn transition<F>(&self, id: JobId, apply: F) -> Result<Job, JobQueueError>
    where
        F: FnOnce(&mut Job),
    {
        let mut state = self.state.write().await;
        let job = state.get_mut(&id).ok_or(JobQueueError::NotFound(id))?;
        if job.state.is_terminal() {
            warn!(job_id = %id, state = %job.state, "rejected transition out of terminal state");
            return Err(JobQueueError::TerminalState {
                id,
                state: job.state,
            });
        }
        apply(job);
        Ok(job.clone())
    }

    /// List job records, most recent first.
    pub async fn list(&self, limit: usize, offset: usize) -> Vec<Job> {
        let state = self.state.read().await;
        state.iter_recent().skip(offset).take(limit).cloned().collect()
    }

    /// Total count of retained job records.
    pub async fn count(&self) -> usize {
        let state = self.state.read().await;
        state.jobs.len()
    }
}
