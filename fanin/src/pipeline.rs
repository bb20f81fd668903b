use std::sync::Arc;

use fanin_config::shared::PipelineConfig;
use tracing::{Instrument, error, info, warn};

use crate::bail;
use crate::concurrency::shutdown::{ShutdownTx, create_shutdown_channel};
use crate::error::{ErrorKind, FaninResult};
use crate::fanin_error;
use crate::queue::WorkQueue;
use crate::sink::{OutputResource, ResultSink, ResultSinkHandle};
use crate::types::{PipelineId, TaskId, WorkItem, WorkerId};
use crate::workers::delay::BoundedRandomDelay;
use crate::workers::pool::WorkerPool;
use crate::workers::process::ProcessWorker;

#[derive(Debug)]
enum PipelineState {
    NotStarted,
    Started {
        pool: WorkerPool,
        sink: ResultSink,
        sink_handle: ResultSinkHandle,
    },
}

/// Aggregate status of a completed run.
///
/// Distinguishes items loaded, records actually persisted, and records lost to
/// each failure kind, so a run that degraded (unavailable output, write
/// failures, cancellation) still completes with a diagnosable report instead of
/// an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Items loaded into the queue during the bulk-load phase.
    pub items_loaded: u64,
    /// Records serialized as whole lines into the output resource.
    pub records_produced: u64,
    /// Records drained and dropped because the output never opened.
    pub records_discarded: u64,
    /// Records lost to individual write failures.
    pub records_lost: u64,
    /// Items still sitting in the queue when the run ended (cancellation).
    pub items_unprocessed: u64,
    /// Workers that terminated abnormally (error or panic).
    pub worker_failures: u64,
    /// Workers that stopped because of the shutdown signal.
    pub cancelled_workers: u64,
    /// Whether the output resource failed to open.
    pub resource_unavailable: bool,
}

/// Coordinator owning the lifecycle of one batch run.
///
/// A [`Pipeline`] moves through a single pass: construct, [`Pipeline::start`]
/// (bulk-load the queue, acquire the output, spawn the fixed worker set), then
/// [`Pipeline::wait`] (workers first, sink drain second). Shutdown flows in
/// reverse dependency order: the sink is told there is no more data only after
/// every worker reached a terminal state, and the run is complete only after
/// the sink finished flushing.
#[derive(Debug)]
pub struct Pipeline<O> {
    id: PipelineId,
    config: Arc<PipelineConfig>,
    output: Option<O>,
    queue: WorkQueue,
    state: PipelineState,
    shutdown_tx: ShutdownTx,
}

impl<O> Pipeline<O>
where
    O: OutputResource,
{
    /// Creates a pipeline over a validated configuration and an output resource.
    pub fn new(id: PipelineId, config: PipelineConfig, output: O) -> Self {
        // We create a watch channel of unit type since this is just used to
        // notify all subscribers that shutdown is needed. Receivers are taken
        // from the transmitter via `subscribe` when workers are spawned.
        let (shutdown_tx, _) = create_shutdown_channel();

        Self {
            id,
            config: Arc::new(config),
            output: Some(output),
            queue: WorkQueue::new(),
            state: PipelineState::NotStarted,
            shutdown_tx,
        }
    }

    pub fn id(&self) -> PipelineId {
        self.id
    }

    /// Returns a clone of the shutdown transmitter, for external triggers such
    /// as a Ctrl-C handler.
    pub fn shutdown_tx(&self) -> ShutdownTx {
        self.shutdown_tx.clone()
    }

    /// Loads the batch, acquires the output resource, and spawns the workers.
    pub async fn start(&mut self) -> FaninResult<()> {
        if let PipelineState::Started { .. } = self.state {
            bail!(ErrorKind::InvalidState, "Pipeline was already started");
        }

        info!(
            workers = self.config.workers,
            items = self.config.batch.items,
            "starting pipeline with id {}",
            self.id
        );

        // Bulk-load the whole fixed batch before any worker starts consuming.
        for i in 1..=self.config.batch.items {
            let payload = format!("{}-{}", self.config.batch.payload_prefix, i);
            self.queue.enqueue(WorkItem::new(TaskId(i), payload)).await;
        }

        let output = self.output.take().ok_or_else(|| {
            fanin_error!(
                ErrorKind::InvalidState,
                "Pipeline output resource was already consumed"
            )
        })?;

        // The sink acquires the output resource here, strictly before the first
        // worker is spawned, so no record can ever be produced while the
        // resource is not yet held.
        let capacity = self.config.batch.items.max(1) as usize;
        let (sink, sink_handle) = ResultSink::start(output, capacity).await;

        let pool = WorkerPool::new();
        for w in 1..=u64::from(self.config.workers) {
            let worker_id = WorkerId(w);
            let worker = ProcessWorker::new(
                worker_id,
                self.queue.clone(),
                sink.clone(),
                BoundedRandomDelay::from_config(&self.config.delay),
                self.shutdown_tx.subscribe(),
            );

            let span =
                tracing::info_span!("process_worker", pipeline_id = self.id, worker_id = %worker_id);
            pool.spawn(worker_id, worker.run().instrument(span.or_current()))
                .await;
        }

        self.state = PipelineState::Started {
            pool,
            sink,
            sink_handle,
        };

        Ok(())
    }

    /// Waits for the run to complete and returns the aggregate report.
    ///
    /// Workers are waited for first, with the configured bounded timeout; on
    /// timeout the shutdown signal is broadcast and the wait resumes, so even a
    /// stuck batch converges. Only after every worker is terminal is the sink
    /// finished, which is also what guarantees the sink never closes before a
    /// pending accept completes.
    pub async fn wait(self) -> FaninResult<RunReport> {
        let PipelineState::Started {
            pool,
            sink,
            sink_handle,
        } = self.state
        else {
            info!("pipeline was not started, nothing to wait for");
            return Ok(RunReport::default());
        };

        info!("waiting for workers to complete");

        let outcome = match self.config.shutdown_timeout() {
            Some(timeout) => match tokio::time::timeout(timeout, pool.wait_all()).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(
                        timeout_ms = timeout.as_millis() as u64,
                        "timed out waiting for workers, requesting shutdown"
                    );

                    // A send failure means every worker already stopped, which
                    // is fine.
                    let _ = self.shutdown_tx.shutdown();

                    pool.wait_all().await
                }
            },
            None => pool.wait_all().await,
        };

        for failure in &outcome.failures {
            error!(error = %failure, "worker terminated abnormally");
        }

        // All workers are terminal. Releasing the producer side lets the sink
        // drain its backlog and stop; finishing it earlier could close the
        // output under a pending accept.
        drop(sink);

        info!("waiting for the sink to drain");
        let sink_report = sink_handle.finish().await?;

        let report = RunReport {
            items_loaded: self.config.batch.items,
            records_produced: sink_report.written,
            records_discarded: sink_report.discarded,
            records_lost: sink_report.write_failures,
            items_unprocessed: self.queue.len().await as u64,
            worker_failures: outcome.failures.len() as u64,
            cancelled_workers: outcome.cancelled_workers(),
            resource_unavailable: sink_report.resource_unavailable,
        };

        info!(
            items_loaded = report.items_loaded,
            records_produced = report.records_produced,
            records_discarded = report.records_discarded,
            records_lost = report.records_lost,
            items_unprocessed = report.items_unprocessed,
            "pipeline run complete"
        );

        Ok(report)
    }

    /// Broadcasts the cooperative shutdown signal to all workers.
    pub fn shutdown(&self) {
        info!("trying to shut down the pipeline");

        if self.shutdown_tx.shutdown().is_err() {
            // No receiver left: the workers already reached a terminal state.
            info!("no running workers to shut down");
            return;
        }

        info!("shutdown signal sent to all workers");
    }

    /// Convenience for shutting down and waiting for the drained report.
    pub async fn shutdown_and_wait(self) -> FaninResult<RunReport> {
        self.shutdown();
        self.wait().await
    }
}
