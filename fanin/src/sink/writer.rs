use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{Instrument, error, info};

use crate::error::{ErrorKind, FaninResult};
use crate::fanin_error;
use crate::sink::base::OutputResource;
use crate::types::ResultRecord;

/// Final accounting of everything the sink's writer task saw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SinkReport {
    /// Records serialized as whole lines into the output resource.
    pub written: u64,
    /// Records drained and dropped because the resource never opened.
    pub discarded: u64,
    /// Records lost to an I/O failure on their individual write.
    pub write_failures: u64,
    /// Whether the output resource failed to open at start.
    pub resource_unavailable: bool,
}

impl SinkReport {
    /// Total number of records the sink accepted, regardless of outcome.
    pub fn accepted(&self) -> u64 {
        self.written + self.discarded + self.write_failures
    }
}

/// Producer-side handle for submitting result records to the sink.
///
/// Cloneable: every worker holds one. The sink's writer task keeps draining
/// until all clones have been dropped, so the coordinator must release its own
/// clone before finishing the sink.
#[derive(Debug, Clone)]
pub struct ResultSink {
    tx: mpsc::Sender<ResultRecord>,
}

impl ResultSink {
    /// Acquires the output resource and spawns the dedicated writer task.
    ///
    /// The open attempt completes before this function returns, so the resource
    /// is held strictly before any worker can produce a record. If the resource
    /// cannot be acquired, the writer task still runs in drain-and-discard mode:
    /// producers never block forever on a sink that has nowhere to write.
    ///
    /// `capacity` bounds the hand-off buffer between producers and the writer.
    pub async fn start<O>(mut output: O, capacity: usize) -> (ResultSink, ResultSinkHandle)
    where
        O: OutputResource,
    {
        let resource_unavailable = match output.open().await {
            Ok(()) => false,
            Err(err) => {
                error!(
                    error = %err,
                    "failed to acquire the output resource, records will be drained and discarded"
                );
                true
            }
        };

        let (tx, mut rx) = mpsc::channel::<ResultRecord>(capacity.max(1));

        let span = tracing::info_span!("result_sink", output = O::name());
        let writer_task = async move {
            let mut report = SinkReport {
                resource_unavailable,
                ..Default::default()
            };

            while let Some(record) = rx.recv().await {
                if report.resource_unavailable {
                    report.discarded += 1;
                    continue;
                }

                // One record, one line: the whole line is handed to the resource
                // in a single call, so concurrent producers can never splice.
                let line = record.to_string();
                if let Err(err) = output.write_line(&line).await {
                    report.write_failures += 1;
                    error!(task_id = %record.task_id, error = %err, "failed to write output line");
                    continue;
                }

                report.written += 1;
            }

            // All producers are gone; flush and release the resource. Failures
            // here are logged, the report is still returned.
            if !report.resource_unavailable {
                if let Err(err) = output.flush().await {
                    error!(error = %err, "failed to flush the output resource");
                }
                if let Err(err) = output.close().await {
                    error!(error = %err, "failed to close the output resource");
                }
            }

            info!(
                written = report.written,
                discarded = report.discarded,
                write_failures = report.write_failures,
                "result sink drained"
            );

            report
        }
        .instrument(span);

        let handle = tokio::spawn(writer_task);

        (
            ResultSink { tx },
            ResultSinkHandle {
                handle: Some(handle),
            },
        )
    }

    /// Hands one result record to the writer task.
    ///
    /// Suspends while the bounded hand-off buffer is full. Fails only when the
    /// writer task has already stopped, in which case the caller should log and
    /// terminate rather than retry.
    pub async fn accept(&self, record: ResultRecord) -> FaninResult<()> {
        self.tx.send(record).await.map_err(|_| {
            fanin_error!(
                ErrorKind::SinkClosed,
                "Result sink is closed",
                "the sink writer task stopped before the record could be handed off"
            )
        })
    }
}

/// Handle for draining and releasing the sink at the end of a run.
#[derive(Debug)]
pub struct ResultSinkHandle {
    handle: Option<JoinHandle<SinkReport>>,
}

impl ResultSinkHandle {
    /// Waits for the writer task to drain all remaining records, flush, and
    /// release the output resource.
    ///
    /// Must only be called after every [`ResultSink`] clone has been dropped;
    /// the writer task runs until the last producer is gone, which is also what
    /// guarantees it never closes before a pending accept completes. Consuming
    /// the handle makes the await-exactly-once contract structural.
    pub async fn finish(mut self) -> FaninResult<SinkReport> {
        let Some(handle) = self.handle.take() else {
            return Ok(SinkReport::default());
        };

        handle.await.map_err(|err| {
            if err.is_cancelled() {
                fanin_error!(
                    ErrorKind::SinkPanic,
                    "Sink writer task was cancelled before draining"
                )
            } else {
                fanin_error!(ErrorKind::SinkPanic, "Sink writer task panicked", source: err)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::memory::MemoryOutput;
    use crate::types::{TaskId, WorkItem, WorkerId};

    fn record(worker: u64, task: u64) -> ResultRecord {
        ResultRecord::completed_now(
            WorkerId(worker),
            WorkItem::new(TaskId(task), format!("data-{task}")),
        )
    }

    #[tokio::test]
    async fn accepted_records_become_whole_lines() {
        let output = MemoryOutput::new();
        let (sink, handle) = ResultSink::start(output.clone(), 8).await;

        for task in 1..=3 {
            sink.accept(record(1, task)).await.unwrap();
        }
        drop(sink);

        let report = handle.finish().await.unwrap();
        assert_eq!(report.written, 3);
        assert_eq!(report.accepted(), 3);
        assert!(!report.resource_unavailable);

        let lines = output.lines().await;
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|line| line.contains("processed Task-")));
        assert!(output.closed().await);
    }

    #[tokio::test]
    async fn unavailable_resource_drains_and_discards() {
        let output = MemoryOutput::unavailable();
        let (sink, handle) = ResultSink::start(output.clone(), 8).await;

        // Producers must not block or fail even though nothing can be written.
        for task in 1..=5 {
            sink.accept(record(1, task)).await.unwrap();
        }
        drop(sink);

        let report = handle.finish().await.unwrap();
        assert!(report.resource_unavailable);
        assert_eq!(report.discarded, 5);
        assert_eq!(report.written, 0);
        assert!(output.lines().await.is_empty());
    }

    #[tokio::test]
    async fn write_failures_are_localized_to_the_failing_record() {
        let output = MemoryOutput::with_failing_writes();
        let (sink, handle) = ResultSink::start(output.clone(), 8).await;

        for task in 1..=4 {
            sink.accept(record(1, task)).await.unwrap();
        }
        drop(sink);

        // The sink keeps draining through write errors instead of aborting.
        let report = handle.finish().await.unwrap();
        assert_eq!(report.write_failures, 4);
        assert_eq!(report.written, 0);
        assert_eq!(report.accepted(), 4);
    }

    #[tokio::test]
    async fn writer_keeps_draining_while_any_producer_is_alive() {
        let (sink, handle) = ResultSink::start(MemoryOutput::new(), 8).await;

        let extra = sink.clone();
        drop(sink);
        let worker = tokio::spawn(async move {
            // Keep the last producer alive until the record is handed off.
            extra.accept(record(1, 1)).await
        });
        worker.await.unwrap().unwrap();

        let report = handle.finish().await.unwrap();
        assert_eq!(report.written, 1);
    }
}
