//! Broadcast cancellation for pipeline stages.
//!
//! The signal is a watch channel over a `bool` that only ever goes from `false` to `true`.
//! Dropping every [`CancelTx`] counts as activation, so an owner that goes out of scope stops
//! its pipeline even if it never called [`CancelTx::cancel`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info};

/// Activating side of a cancellation signal.
///
/// Clones share the same signal. The signal is activated by [`CancelTx::cancel`] or once the
/// last clone is dropped.
#[derive(Debug, Clone)]
pub struct CancelTx(Arc<watch::Sender<bool>>);

impl CancelTx {
    /// Activates the signal.
    ///
    /// Returns `true` if this call performed the transition and `false` if the signal was
    /// already active. Concurrent callers race on a single atomic replace, so exactly one of
    /// them observes `true`.
    pub fn cancel(&self) -> bool {
        // `send_replace` succeeds even when no receiver is subscribed.
        let was_cancelled = self.0.send_replace(true);
        if !was_cancelled {
            info!("cancellation signal activated");
        }

        !was_cancelled
    }

    /// Returns `true` once the signal has been activated.
    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    /// Creates a new observer of this signal.
    pub fn subscribe(&self) -> CancelRx {
        CancelRx(self.0.subscribe())
    }

    /// Activates the signal after `delay`.
    ///
    /// The timer task does not keep the signal alive: if every [`CancelTx`] is dropped first,
    /// the signal is already active and the timer has nothing left to do. Aborting the returned
    /// handle disarms the timer.
    pub fn cancel_after(&self, delay: Duration) -> JoinHandle<()> {
        let signal = Arc::downgrade(&self.0);

        tokio::spawn(async move {
            sleep(delay).await;

            let Some(signal) = signal.upgrade() else {
                return;
            };

            debug!(?delay, "cancellation timer fired");
            CancelTx(signal).cancel();
        })
    }
}

/// Observing side of a cancellation signal.
#[derive(Debug, Clone)]
pub struct CancelRx(watch::Receiver<bool>);

impl CancelRx {
    /// Returns `true` once the signal has been activated or every [`CancelTx`] was dropped.
    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow() || self.0.has_changed().is_err()
    }

    /// Resolves once the signal is activated.
    ///
    /// Resolves immediately if it already was. Cancel safe, so it can be raced against stream
    /// operations in `tokio::select!`.
    pub async fn cancelled(&mut self) {
        // An error means every sender is gone, which counts as activation.
        let _ = self.0.wait_for(|cancelled| *cancelled).await;
    }
}

/// Creates a new, inactive cancellation signal.
pub fn create_cancel_channel() -> (CancelTx, CancelRx) {
    let (tx, rx) = watch::channel(false);
    (CancelTx(Arc::new(tx)), CancelRx(rx))
}
