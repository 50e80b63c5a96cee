use std::time::Duration;

use tokio::task::JoinHandle;

/// CloseTimer
///
/// An owned, cancellable deferred callback. The callback runs once after `delay` unless
/// the timer is cancelled or dropped first; dropping the handle aborts the task, so no
/// callback outlives its owner.
#[derive(Debug)]
pub struct CloseTimer {
    handle: JoinHandle<()>,
}

impl CloseTimer {
    /// Schedules `on_fire` on the current Tokio runtime.
    pub fn schedule<F>(delay: Duration, on_fire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire();
        });
        Self { handle }
    }

    pub fn cancel(self) {
        drop(self);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for CloseTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
