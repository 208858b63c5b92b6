//! Cancellation and completion tracking for scheduled work.

use std::sync::Arc;

use tokio::sync::watch;

/// Handle to a scheduled task.
///
/// Cancellation is cooperative: the task observes it at its next tick
/// boundary and never mid-tick. Cloning shares the same task.
#[derive(Clone, Debug)]
pub struct TaskHandle {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    cancelled: watch::Sender<bool>,
    finished: watch::Sender<bool>,
}

impl TaskHandle {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: watch::Sender::new(false),
                finished: watch::Sender::new(false),
            }),
        }
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancelled.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancelled.borrow()
    }

    pub fn is_finished(&self) -> bool {
        *self.inner.finished.borrow()
    }

    /// Waits until the task has run its last tick.
    pub async fn finished(&self) {
        let mut rx = self.inner.finished.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|done| *done).await;
    }

    pub(crate) fn mark_finished(&self) {
        self.inner.finished.send_replace(true);
    }

    /// Resolves once cancellation is requested.
    pub(crate) async fn cancelled(&self) {
        let mut rx = self.inner.cancelled.subscribe();
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}
