use std::sync::Once;

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt;

/// Errors that can occur while initializing tracing.
#[derive(Debug, Error)]
pub enum InitTracingError {
    /// A global subscriber was already installed.
    #[error("failed to install the global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Initializes the global tracing subscriber for a service binary.
///
/// Log level defaults to `info` and is overridable via `RUST_LOG`. Every event
/// carries the service name as a field so multi-service logs stay attributable.
pub fn init_tracing(service_name: &str) -> Result<(), InitTracingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .finish()
        .try_init()?;

    ::tracing::info!(service = service_name, "tracing initialized");

    Ok(())
}

/// Initializes tracing for tests.
///
/// Safe to call from every test; only the first call installs the subscriber.
/// Respects `RUST_LOG`, defaulting to `info`.
pub fn init_test_tracing() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}
