//! Cooperative stop signal shared by every thread of a run.

use std::sync::{Arc, Mutex, PoisonError};

use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded};

/// A clonable cancellation handle.
///
/// Nothing is ever sent on the inner channel: cancelling drops its only
/// sender, which makes every `recv` on [`signal`](Self::signal) ready at
/// once. Blocking points select on the signal next to their real work.
#[derive(Debug, Clone)]
pub struct CancelToken {
    signal: Receiver<()>,
    trigger: Arc<Mutex<Option<Sender<()>>>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = bounded(0);
        Self {
            signal: rx,
            trigger: Arc::new(Mutex::new(Some(tx))),
        }
    }

    /// Fire the signal. Idempotent.
    pub fn cancel(&self) {
        let mut trigger = self.trigger.lock().unwrap_or_else(PoisonError::into_inner);
        trigger.take();
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.signal.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Receiver that becomes ready (disconnected) once cancelled.
    pub fn signal(&self) -> &Receiver<()> {
        &self.signal
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
