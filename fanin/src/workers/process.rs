use tracing::{error, info};

use crate::concurrency::shutdown::ShutdownRx;
use crate::error::FaninResult;
use crate::queue::WorkQueue;
use crate::sink::ResultSink;
use crate::types::{ResultRecord, WorkerId};
use crate::workers::delay::DelayGenerator;

/// Final accounting for one worker's run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSummary {
    /// Identity of the worker.
    pub worker_id: WorkerId,
    /// Number of items fully processed into result records.
    pub processed: u64,
    /// Whether the worker stopped because it observed the shutdown signal.
    pub cancelled: bool,
}

/// Worker that drains the shared queue and produces result records.
///
/// [`ProcessWorker`] runs a loop entirely independent of its siblings except
/// through the queue and the sink: dequeue an item, simulate bounded
/// processing, hand the resulting record to the sink, repeat. An empty queue
/// terminates the loop normally; the shutdown signal terminates it
/// cooperatively, checked once per iteration and while suspended in the
/// processing delay.
#[derive(Debug)]
pub struct ProcessWorker<D> {
    worker_id: WorkerId,
    queue: WorkQueue,
    sink: ResultSink,
    delay: D,
    shutdown_rx: ShutdownRx,
}

impl<D> ProcessWorker<D>
where
    D: DelayGenerator,
{
    /// Creates a new worker over the shared queue and sink.
    pub fn new(
        worker_id: WorkerId,
        queue: WorkQueue,
        sink: ResultSink,
        delay: D,
        shutdown_rx: ShutdownRx,
    ) -> Self {
        Self {
            worker_id,
            queue,
            sink,
            delay,
            shutdown_rx,
        }
    }

    /// Runs the worker loop to completion.
    ///
    /// Returns the worker's summary on normal or cancelled termination. Errors
    /// are returned only when the sink becomes unreachable; the pool isolates
    /// them from sibling workers.
    pub async fn run(mut self) -> FaninResult<WorkerSummary> {
        info!("worker started");

        let mut summary = WorkerSummary {
            worker_id: self.worker_id,
            processed: 0,
            cancelled: false,
        };

        loop {
            if self.shutdown_rx.has_changed().unwrap_or(false) {
                summary.cancelled = true;
                break;
            }

            // Empty queue is the normal termination signal, not an error.
            let Some(item) = self.queue.try_dequeue().await else {
                break;
            };
            info!(task_id = %item.id, "picked task");

            // Simulated processing. The worker suspends here without holding
            // any lock, and the delay stays interruptible by shutdown.
            let delay = self.delay.next_delay();
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = self.shutdown_rx.changed() => {
                    info!(task_id = %item.id, "shutdown observed while processing, stopping");
                    summary.cancelled = true;
                    break;
                }
            }

            let record = ResultRecord::completed_now(self.worker_id, item);
            let task_id = record.task_id;
            if let Err(err) = self.sink.accept(record).await {
                error!(task_id = %task_id, error = %err, "failed to hand record to the sink, stopping");
                return Err(err);
            }

            summary.processed += 1;
            info!(task_id = %task_id, "completed task");
        }

        info!(
            processed = summary.processed,
            cancelled = summary.cancelled,
            "worker finished"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concurrency::shutdown::create_shutdown_channel;
    use crate::sink::memory::MemoryOutput;
    use crate::types::{TaskId, WorkItem};
    use crate::workers::delay::FixedDelay;
    use std::time::Duration;

    async fn loaded_queue(items: u64) -> WorkQueue {
        let queue = WorkQueue::new();
        for id in 1..=items {
            queue
                .enqueue(WorkItem::new(TaskId(id), format!("data-{id}")))
                .await;
        }
        queue
    }

    #[tokio::test]
    async fn worker_drains_the_queue_and_produces_one_record_per_item() {
        let queue = loaded_queue(5).await;
        let (sink, handle) = crate::sink::ResultSink::start(MemoryOutput::new(), 8).await;
        let (_shutdown_tx, shutdown_rx) = create_shutdown_channel();

        let worker = ProcessWorker::new(
            WorkerId(1),
            queue.clone(),
            sink.clone(),
            FixedDelay::zero(),
            shutdown_rx,
        );
        let summary = worker.run().await.unwrap();

        assert_eq!(summary.processed, 5);
        assert!(!summary.cancelled);
        assert!(queue.is_empty().await);

        drop(sink);
        let report = handle.finish().await.unwrap();
        assert_eq!(report.written, 5);
    }

    #[tokio::test]
    async fn worker_stops_promptly_when_shutdown_interrupts_the_delay() {
        let queue = loaded_queue(10).await;
        let (sink, handle) = crate::sink::ResultSink::start(MemoryOutput::new(), 8).await;
        let (shutdown_tx, shutdown_rx) = create_shutdown_channel();

        let worker = ProcessWorker::new(
            WorkerId(1),
            queue.clone(),
            sink.clone(),
            FixedDelay::new(Duration::from_secs(30)),
            shutdown_rx,
        );
        let run = tokio::spawn(worker.run());

        // Give the worker time to dequeue and suspend in its delay.
        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.shutdown().unwrap();

        let summary = tokio::time::timeout(Duration::from_secs(1), run)
            .await
            .expect("worker must observe shutdown promptly")
            .unwrap()
            .unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.processed, 0);
        // The in-flight item is dropped; undequeued items stay in the queue.
        assert_eq!(queue.len().await, 9);

        drop(sink);
        assert_eq!(handle.finish().await.unwrap().written, 0);
    }
}
