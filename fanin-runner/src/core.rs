use fanin::pipeline::{Pipeline, RunReport};
use fanin::sink::{OutputResource, file::FileOutput, memory::MemoryOutput};
use fanin_config::shared::{DestinationConfig, PipelineConfig, RunnerConfig};
use tokio::signal::unix::{SignalKind, signal};
use tracing::{debug, info, warn};

use crate::error::RunnerResult;

/// Starts the runner service with the provided configuration.
///
/// Creates the appropriate output resource based on configuration and runs the
/// pipeline to completion. Dispatch is static per destination variant.
pub async fn start_runner_with_config(runner_config: RunnerConfig) -> RunnerResult<RunReport> {
    info!("starting runner service");

    log_config(&runner_config);

    match &runner_config.destination {
        DestinationConfig::Memory => {
            let output = MemoryOutput::new();
            let pipeline = Pipeline::new(runner_config.pipeline.id, runner_config.pipeline, output);
            run_pipeline(pipeline).await
        }
        DestinationConfig::File { path } => {
            let output = FileOutput::new(path.clone());
            let pipeline = Pipeline::new(runner_config.pipeline.id, runner_config.pipeline, output);
            run_pipeline(pipeline).await
        }
    }
}

/// Runs a pipeline to completion, wiring up graceful shutdown signals.
///
/// Listens for SIGINT and SIGTERM while the pipeline runs; either triggers the
/// cooperative shutdown signal so workers stop at the next opportunity and the
/// sink drains what was already produced.
#[tracing::instrument(skip(pipeline), fields(pipeline_id = pipeline.id()))]
async fn run_pipeline<O>(mut pipeline: Pipeline<O>) -> RunnerResult<RunReport>
where
    O: OutputResource,
{
    pipeline.start().await?;

    let shutdown_tx = pipeline.shutdown_tx();
    let shutdown_handle = tokio::spawn(async move {
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(err) => {
                warn!(error = %err, "failed to register SIGTERM handler");
                return;
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("sigint (ctrl+c) received, shutting down pipeline");
            }
            _ = sigterm.recv() => {
                info!("sigterm received, shutting down pipeline");
            }
        }

        if let Err(err) = shutdown_tx.shutdown() {
            warn!(error = ?err, "failed to send shutdown signal");
        }
    });

    let result = pipeline.wait().await;

    // If the pipeline finished before any signal arrived, the signal task is
    // still waiting and must not outlive the run.
    shutdown_handle.abort();
    let _ = shutdown_handle.await;

    let report = result?;

    if report.worker_failures > 0 || report.records_lost > 0 || report.resource_unavailable {
        warn!(
            worker_failures = report.worker_failures,
            records_lost = report.records_lost,
            resource_unavailable = report.resource_unavailable,
            "run completed with degradations"
        );
    }

    info!(
        records_produced = report.records_produced,
        items_unprocessed = report.items_unprocessed,
        cancelled_workers = report.cancelled_workers,
        "run finished"
    );

    Ok(report)
}

fn log_config(config: &RunnerConfig) {
    log_destination_config(&config.destination);
    log_pipeline_config(&config.pipeline);
}

fn log_destination_config(config: &DestinationConfig) {
    match config {
        DestinationConfig::Memory => {
            debug!("using memory destination config");
        }
        DestinationConfig::File { path } => {
            debug!(path = %path.display(), "using file destination config");
        }
    }
}

fn log_pipeline_config(config: &PipelineConfig) {
    debug!(
        pipeline_id = config.id,
        workers = config.workers,
        items = config.batch.items,
        payload_prefix = config.batch.payload_prefix,
        delay_min_ms = config.delay.min_ms,
        delay_max_ms = config.delay.max_ms,
        shutdown_timeout_ms = config.shutdown_timeout_ms,
        "pipeline config"
    );
}
