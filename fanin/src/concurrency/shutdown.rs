//! Broadcast shutdown signaling for worker coordination.
//!
//! Abstracts tokio's watch channels into a shutdown signal with one transmitter
//! and any number of receivers. The signal carries no payload; observing a
//! change means "stop looping as soon as it is safe to do so".

use tokio::sync::watch;

/// Transmitter side of the shutdown channel.
///
/// Cloneable so the owner of the pipeline can hand it to external triggers
/// (e.g. a Ctrl-C handler) while keeping its own copy for timeout-driven
/// cancellation.
#[derive(Debug, Clone)]
pub struct ShutdownTx(watch::Sender<()>);

impl ShutdownTx {
    /// Broadcasts the shutdown signal to all subscribed receivers.
    ///
    /// Fails only when no receiver is alive anymore, which callers generally
    /// treat as "everything already stopped".
    pub fn shutdown(&self) -> Result<(), watch::error::SendError<()>> {
        self.0.send(())
    }

    /// Creates a new receiver subscribed to this transmitter.
    ///
    /// Receivers created after the signal was sent will not observe it, so all
    /// subscriptions must happen before workers are spawned.
    pub fn subscribe(&self) -> ShutdownRx {
        self.0.subscribe()
    }
}

/// Receiver side of the shutdown channel.
///
/// Workers poll it with `has_changed` once per loop iteration and select on
/// `changed()` while suspended, so the signal is observed promptly without
/// ever being polled under a lock.
pub type ShutdownRx = watch::Receiver<()>;

/// Creates a new shutdown channel.
///
/// The initial receiver is returned for convenience; further receivers are
/// obtained via [`ShutdownTx::subscribe`].
pub fn create_shutdown_channel() -> (ShutdownTx, ShutdownRx) {
    let (tx, rx) = watch::channel(());
    (ShutdownTx(tx), rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn all_subscribers_observe_a_single_shutdown() {
        let (tx, _) = create_shutdown_channel();

        let mut first = tx.subscribe();
        let mut second = tx.subscribe();
        assert!(!first.has_changed().unwrap());

        tx.shutdown().unwrap();

        assert!(first.has_changed().unwrap());
        assert!(second.has_changed().unwrap());
        first.changed().await.unwrap();
        second.changed().await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_without_receivers_reports_closed() {
        let (tx, rx) = create_shutdown_channel();
        drop(rx);

        assert!(tx.shutdown().is_err());
    }
}
