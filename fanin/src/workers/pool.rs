use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::error::{ErrorKind, FaninError, FaninResult};
use crate::fanin_error;
use crate::types::WorkerId;
use crate::workers::process::WorkerSummary;

/// Everything the pool observed while waiting for its workers.
///
/// Failures are collected instead of propagated so that one worker's error or
/// panic can never take down its siblings or the coordinator's wait.
#[derive(Debug, Default)]
pub struct PoolOutcome {
    /// Summaries of workers that reached a terminal state cleanly.
    pub summaries: Vec<WorkerSummary>,
    /// Errors and panics from workers that terminated abnormally.
    pub failures: Vec<FaninError>,
}

impl PoolOutcome {
    /// Total number of items processed across all workers.
    pub fn processed(&self) -> u64 {
        self.summaries.iter().map(|summary| summary.processed).sum()
    }

    /// Number of workers that stopped due to the shutdown signal.
    pub fn cancelled_workers(&self) -> u64 {
        self.summaries
            .iter()
            .filter(|summary| summary.cancelled)
            .count() as u64
    }
}

/// Internal state for [`WorkerPool`].
#[derive(Debug, Default)]
struct WorkerPoolInner {
    /// Owns all spawned worker tasks.
    join_set: JoinSet<(WorkerId, FaninResult<WorkerSummary>)>,
    /// Results collected so far. Lives here rather than in a `wait_all` local
    /// so an abandoned wait loses nothing.
    outcome: PoolOutcome,
}

/// Pool owning the fixed set of processing workers for one run.
///
/// [`WorkerPool`] spawns worker futures into a shared [`JoinSet`] and waits for
/// all of them to reach a terminal state, tolerating early or abnormal
/// termination of individual workers.
#[derive(Debug, Clone, Default)]
pub struct WorkerPool {
    inner: Arc<Mutex<WorkerPoolInner>>,
}

impl WorkerPool {
    /// Creates a new empty worker pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a worker future into the pool.
    pub async fn spawn<F>(&self, worker_id: WorkerId, future: F)
    where
        F: Future<Output = FaninResult<WorkerSummary>> + Send + 'static,
    {
        let mut inner = self.inner.lock().await;
        inner.join_set.spawn(async move {
            let result = future.await;
            (worker_id, result)
        });

        debug!(%worker_id, "spawned worker in pool");
    }

    /// Waits for every worker in the pool to reach a terminal state.
    ///
    /// Worker errors are logged and collected; panics are mapped to
    /// [`ErrorKind::WorkerPanic`]. Cancelling the future returned here and
    /// calling `wait_all` again is safe: results already collected are kept in
    /// the pool and the next call resumes from them, which is what the
    /// coordinator's bounded wait relies on.
    pub async fn wait_all(&self) -> PoolOutcome {
        loop {
            let mut inner = self.inner.lock().await;

            let Some(result) = inner.join_set.join_next().await else {
                // JoinSet is empty, all workers have completed.
                return std::mem::take(&mut inner.outcome);
            };

            // Recording happens under the same lock acquisition with no await
            // in between, so a result consumed from the join set can never be
            // lost when the surrounding future is dropped.
            match result {
                Ok((_, Ok(summary))) => inner.outcome.summaries.push(summary),
                Ok((worker_id, Err(err))) => {
                    error!(%worker_id, error = %err, "worker completed with error");
                    inner.outcome.failures.push(err);
                }
                Err(join_err) => {
                    if join_err.is_cancelled() {
                        debug!("worker task was cancelled");
                    } else {
                        inner.outcome.failures.push(fanin_error!(
                            ErrorKind::WorkerPanic,
                            "Processing worker panicked",
                            source: join_err
                        ));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bail;

    fn summary(worker_id: u64, processed: u64) -> WorkerSummary {
        WorkerSummary {
            worker_id: WorkerId(worker_id),
            processed,
            cancelled: false,
        }
    }

    #[tokio::test]
    async fn wait_all_collects_summaries_from_every_worker() {
        let pool = WorkerPool::new();
        for id in 1..=4 {
            pool.spawn(WorkerId(id), async move { Ok(summary(id, id * 2)) })
                .await;
        }

        let outcome = pool.wait_all().await;
        assert_eq!(outcome.summaries.len(), 4);
        assert_eq!(outcome.processed(), 2 + 4 + 6 + 8);
        assert!(outcome.failures.is_empty());
    }

    #[tokio::test]
    async fn failing_and_panicking_workers_do_not_disturb_siblings() {
        let pool = WorkerPool::new();
        pool.spawn(WorkerId(1), async { Ok(summary(1, 3)) }).await;
        pool.spawn(WorkerId(2), async {
            bail!(ErrorKind::SinkClosed, "Result sink is closed")
        })
        .await;
        pool.spawn(WorkerId(3), async { panic!("worker exploded") })
            .await;

        let outcome = pool.wait_all().await;
        assert_eq!(outcome.summaries, vec![summary(1, 3)]);
        assert_eq!(outcome.failures.len(), 2);

        let kinds: Vec<_> = outcome.failures.iter().map(|err| err.kind()).collect();
        assert!(kinds.contains(&ErrorKind::SinkClosed));
        assert!(kinds.contains(&ErrorKind::WorkerPanic));
    }

    #[tokio::test]
    async fn abandoned_wait_keeps_already_collected_results() {
        use std::time::Duration;

        let pool = WorkerPool::new();
        pool.spawn(WorkerId(1), async {
            bail!(ErrorKind::SinkClosed, "Result sink is closed")
        })
        .await;
        pool.spawn(WorkerId(2), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok(summary(2, 5))
        })
        .await;

        // The first wait consumes the failure, then gets dropped while the
        // slow worker is still running.
        let aborted = tokio::time::timeout(Duration::from_millis(200), pool.wait_all()).await;
        assert!(aborted.is_err());

        let outcome = pool.wait_all().await;
        assert_eq!(outcome.summaries, vec![summary(2, 5)]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].kind(), ErrorKind::SinkClosed);
    }

    #[tokio::test]
    async fn wait_all_on_an_empty_pool_returns_immediately() {
        let pool = WorkerPool::new();
        let outcome = pool.wait_all().await;

        assert!(outcome.summaries.is_empty());
        assert!(outcome.failures.is_empty());
    }
}
