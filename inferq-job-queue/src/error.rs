//! Error types for the job store and work queue.

use thiserror::Error;

use crate::types::{JobId, JobState};

/// Errors that may occur while interacting with the job store or queue.
#[derive(Debug, Error)]
pub enum JobQueueError {
    #[error("job not found: {0}")]
    NotFound(JobId),

    #[error("job {id} is already {state}, transition rejected")]
    TerminalState { id: JobId, state: JobState },

    #[error("work queue is closed")]
    QueueClosed,
}
