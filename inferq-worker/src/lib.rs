//! Worker pool and retry pipeline for the inferq service.
//!
//! Workers pull job IDs from the shared
//! [`WorkQueue`](inferq_job_queue::WorkQueue), check the memoization cache,
//! call the inference provider under a bounded retry policy, and write the
//! terminal outcome into the [`JobStore`](inferq_job_queue::JobStore).
//!
//! # Architecture
//!
//! - [`WorkerPool`] - N concurrent consumer tasks with graceful shutdown
//! - [`WorkerContext`] - Shared handles a worker processes jobs with
//! - [`process_job`] - The per-job state machine
//! - [`RetryPolicy`] - Attempt bound, backoff base, per-attempt timeout
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use inferq_cache::MemoryCache;
//! use inferq_client::ScriptedClient;
//! use inferq_job_queue::{JobStore, WorkQueue};
//! use inferq_worker::{RetryPolicy, WorkerContext, WorkerPool};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = JobStore::new();
//!     let queue = WorkQueue::new();
//!     let ctx = WorkerContext {
//!         store: store.clone(),
//!         cache: Arc::new(MemoryCache::new()),
//!         client: Arc::new(ScriptedClient::always_ok("ok")),
//!         policy: RetryPolicy::default(),
//!     };
//!
//!     let pool = WorkerPool::spawn(4, queue.clone(), ctx);
//!
//!     let job = store.create("Summarize", "The quick brown fox").await;
//!     queue.enqueue(job.id).unwrap();
//!
//!     pool.shutdown().await;
//! }
//! ```

mod pipeline;
mod pool;
mod retry;

pub use pipeline::{process_job, WorkerContext};
pub use pool::WorkerPool;
pub use retry::RetryPolicy;
