//! Concurrency-safe FIFO distribution of work items.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::types::WorkItem;

/// Concurrency-safe FIFO queue that distributes work items to the worker pool.
///
/// [`WorkQueue`] is the sole authority on "is there more work": an empty result
/// from [`WorkQueue::try_dequeue`] is the normal termination signal for workers,
/// never an error. All mutating operations are serialized through an internal
/// mutex, so each item is delivered to exactly one worker.
///
/// Callers must not hold the lock across an await point; every method here takes
/// and releases it within the call.
#[derive(Debug, Clone, Default)]
pub struct WorkQueue {
    inner: Arc<Mutex<VecDeque<WorkItem>>>,
}

impl WorkQueue {
    /// Creates a new empty work queue.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Appends an item to the tail of the queue.
    pub async fn enqueue(&self, item: WorkItem) {
        let mut inner = self.inner.lock().await;
        inner.push_back(item);
    }

    /// Atomically removes and returns the head item, or `None` if the queue is
    /// empty.
    ///
    /// `None` is a first-class terminal signal to consumers, not a failure. No
    /// two calls ever return the same item.
    pub async fn try_dequeue(&self) -> Option<WorkItem> {
        let mut inner = self.inner.lock().await;
        inner.pop_front()
    }

    /// Returns a best-effort snapshot of the number of queued items.
    ///
    /// Only useful for observability and final reporting. A size check followed
    /// by a dequeue is not guaranteed consistent under concurrency, so control
    /// decisions must rely on [`WorkQueue::try_dequeue`] instead.
    pub async fn len(&self) -> usize {
        let inner = self.inner.lock().await;
        inner.len()
    }

    /// Returns whether the queue currently holds no items.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
