//! Fanin runner service binary.
//!
//! Loads configuration, initializes tracing, starts the async runtime, and runs
//! one batch pipeline to completion with graceful shutdown on SIGINT/SIGTERM.

use tracing::error;

use crate::config::load_runner_config;
use crate::core::start_runner_with_config;
use crate::error::{RunnerError, RunnerResult};

mod config;
mod core;
mod error;

fn main() -> RunnerResult<()> {
    let runner_config = load_runner_config()?;

    fanin_telemetry::tracing::init_tracing(env!("CARGO_BIN_NAME"))
        .map_err(RunnerError::config)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main(runner_config))?;

    Ok(())
}

async fn async_main(runner_config: fanin_config::shared::RunnerConfig) -> RunnerResult<()> {
    if let Err(err) = start_runner_with_config(runner_config).await {
        error!(category = err.category(), "{err}");

        if error::should_render_backtrace()
            && let Some(backtrace) = err.backtrace()
        {
            error!("backtrace:\n{backtrace}");
        }

        return Err(err);
    }

    Ok(())
}
