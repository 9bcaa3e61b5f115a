//! Job store and work queue for the inferq service.
//!
//! This crate owns the job lifecycle: a submitted `(prompt, input)` pair
//! becomes a [`Job`] record in the [`JobStore`], its ID travels through the
//! [`WorkQueue`] to a worker, and the worker writes the terminal outcome
//! back into the store for pollers to read.
//!
//! # Architecture
//!
//! - [`JobStore`] - Durable record of job identity, state, and result
//! - [`WorkQueue`] - Ordered hand-off channel from submitters to workers
//! - [`Job`] / [`JobState`] - The job record and its state machine
//! - [`JobId`] - Opaque identifier, the sole lookup key for status/result
//!
//! # Example
//!
//! ```rust,no_run
//! use inferq_job_queue::{JobStore, WorkQueue};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = JobStore::new();
//!     let queue = WorkQueue::new();
//!
//!     // Submission: record first, then hand off.
//!     let job = store.create("Summarize", "The quick brown fox").await;
//!     queue.enqueue(job.id).unwrap();
//!
//!     // A worker picks it up.
//!     let id = queue.dequeue().await.unwrap();
//!     store.mark_running(id).await.unwrap();
//!     store.mark_completed(id, "A fox is quick and brown.").await.unwrap();
//! }
//! ```

mod error;
mod queue;
mod store;
mod types;

pub use error::JobQueueError;
pub use queue::WorkQueue;
pub use store::JobStore;
pub use types::{Job, JobId, JobState};
