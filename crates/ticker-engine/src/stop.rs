//! Cooperative stop signal for the scheduler loop.

use std::time::Duration;
use tokio::sync::watch;

/// Requests a stop. Cloneable; any clone may trigger it.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

/// Observes stop requests at the loop's safe points.
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

/// Create a connected handle/signal pair.
pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = watch::channel(false);
    (StopHandle { tx }, StopSignal { rx })
}

impl StopHandle {
    /// Ask the loop to stop at its next safe point.
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }
}

impl StopSignal {
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once a stop was requested. Never resolves if every handle was
    /// dropped without stopping.
    pub async fn stopped(&mut self) {
        while !*self.rx.borrow_and_update() {
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Sleep for `duration`, waking early on a stop request. Returns true
    /// when stopped.
    pub async fn sleep(&mut self, duration: Duration) -> bool {
        if duration.is_zero() {
            return self.is_stopped();
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => false,
            _ = self.stopped() => true,
        }
    }
}
