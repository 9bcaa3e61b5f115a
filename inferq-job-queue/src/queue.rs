//! Work queue hand-off between submitters and workers.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::error::JobQueueError;
use crate::types::JobId;

/// Ordered hand-off channel from submitters to workers.
///
/// Only job IDs travel through the queue; the [`JobStore`](crate::JobStore)
/// remains the durable owner of the job record, so the queue holds a job
/// only transiently while it is in transit. Enqueue never blocks the
/// submitter; dequeue awaits until a job is available. FIFO order falls out
/// of the underlying channel but is not load-bearing.
#[derive(Clone)]
pub struct WorkQueue {
    tx: mpsc::UnboundedSender<JobId>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<JobId>>>,
}

impl fmt::Debug for WorkQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkQueue").finish_non_exhaustive()
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    /// Hand a job off for asynchronous processing. Returns immediately.
    pub fn enqueue(&self, id: JobId) -> Result<(), JobQueueError> {
        self.tx.send(id).map_err(|_| JobQueueError::QueueClosed)
    }

    /// Wait for the next job. Returns `None` once the queue is closed and
    /// drained, signalling the worker to exit.
    ///
    /// Workers contend on the receiver lock; whichever holds it takes the
    /// next job and releases before processing, so jobs still fan out
    /// across the pool.
    pub async fn dequeue(&self) -> Option<JobId> {
        let mut rx = self.rx.lock().await;
        rx.recv().await
    }

    /// Close the queue for further submissions. Jobs already enqueued are
    /// still delivered.
    pub async fn close(&self) {
        self.rx.lock().await.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_in_fifo_order() {
        let queue = WorkQueue::new();
        let a = JobId::new();
        let b = JobId::new();
        let c = JobId::new();

        queue.enqueue(a).unwrap();
        queue.enqueue(b).unwrap();
        queue.enqueue(c).unwrap();

        assert_eq!(queue.dequeue().await, Some(a));
        assert_eq!(queue.dequeue().await, Some(b));
        assert_eq!(queue.dequeue().await, Some(c));
    }

    #[tokio::test]
    async fn dequeue_waits_for_submission() {
        let queue = WorkQueue::new();
        let id = JobId::new();

        let waiter = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.dequeue().await })
        };

        tokio::task::yield_now().await;
        queue.enqueue(id).unwrap();

        assert_eq!(waiter.await.unwrap(), Some(id));
    }

    #[tokio::test]
    async fn close_drains_then_ends() {
        let queue = WorkQueue::new();
        let id = JobId::new();
        queue.enqueue(id).unwrap();
        queue.close().await;

        assert!(queue.enqueue(JobId::new()).is_err());
        assert_eq!(queue.dequeue().await, Some(id));
        assert_eq!(queue.dequeue().await, None);
    }
}
