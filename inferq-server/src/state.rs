use inferq_job_queue::{Job, JobStore, WorkQueue};

use crate::error::ApiError;

/// Shared application state passed to every route handler.
///
/// The gateway touches only two things: the queue (enqueue) and the store
/// (read). Workers own everything in between.
#[derive(Clone)]
pub struct AppState {
    pub store: JobStore,
    pub queue: WorkQueue,
}

impl AppState {
    pub fn new(store: JobStore, queue: WorkQueue) -> Self {
        Self { store, queue }
    }

    /// Record a new job and hand it off for asynchronous processing.
    ///
    /// The record exists before the hand-off, so a submitted job is never
    /// invisible to pollers even if it has not been dequeued yet.
    pub async fn submit(
        &self,
        prompt: impl Into<String>,
        input: impl Into<String>,
    ) -> Result<Job, ApiError> {
        let job = self.store.create(prompt, input).await;
        self.queue.enqueue(job.id)?;
        Ok(job)
    }
}
