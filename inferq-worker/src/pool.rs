//! Worker pool: concurrent consumers of the shared work queue.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use inferq_job_queue::{JobId, WorkQueue};

use crate::pipeline::{process_job, WorkerContext};

/// A fixed pool of worker tasks pulling independently from the shared queue.
///
/// Each worker's blocking (provider latency plus backoff sleeps) is isolated
/// to its own task. A failure inside one job never takes down the worker
/// loop: each job runs in its own spawned task, and a panic there is
/// converted into a `Failed` record so no job is left `Running` forever.
pub struct WorkerPool {
    shutdown: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `workers` consumer tasks over the given queue.
    pub fn spawn(workers: usize, queue: WorkQueue, ctx: WorkerContext) -> Self {
        let shutdown = CancellationToken::new();
        let handles = (0..workers)
            .map(|worker_id| {
                let queue = queue.clone();
                let ctx = ctx.clone();
                let shutdown = shutdown.clone();
                tokio::spawn(worker_loop(worker_id, queue, ctx, shutdown))
            })
            .collect();

        info!(workers, "worker pool started");
        Self { shutdown, handles }
    }

    /// Stop accepting new work and wait for in-flight jobs to finish.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("worker task did not shut down cleanly: {}", e);
            }
        }
        info!("worker pool stopped");
    }
}

async fn worker_loop(
    worker_id: usize,
    queue: WorkQueue,
    ctx: WorkerContext,
    shutdown: CancellationToken,
) {
    debug!(worker_id, "worker started");
    loop {
        let id = tokio::select! {
            _ = shutdown.cancelled() => break,
            dequeued = queue.dequeue() => match dequeued {
                Some(id) => id,
                None => break,
            },
        };

        run_one(worker_id, &ctx, id).await;
    }
    debug!(worker_id, "worker stopped");
}

/// Run a single job in its own task so a panic is contained to that job.
async fn run_one(worker_id: usize, ctx: &WorkerContext, id: JobId) {
    let task = {
        let ctx = ctx.clone();
        tokio::spawn(async move { process_job(&ctx, id).await })
    };

    match task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(worker_id, job_id = %id, "job processing error: {}", e),
        Err(join_err) if join_err.is_panic() => {
            error!(worker_id, job_id = %id, "worker panicked during processing");
            if let Err(e) = ctx
                .store
                .mark_failed(id, "worker panicked during processing")
                .await
            {
                warn!(job_id = %id, "could not record panic outcome: {}", e);
            }
        }
        Err(join_err) => warn!(worker_id, job_id = %id, "job task cancelled: {}", join_err),
    }
}
