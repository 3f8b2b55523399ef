//! Cancellable delayed task

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// A callback scheduled to run once after a delay.
///
/// Dropping the handle aborts the task; if the delay has not elapsed yet the
/// callback never runs.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Spawn `f` to run after `delay`. Must be called inside a tokio runtime.
    pub fn after<F>(delay: Duration, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            f();
        });
        Self { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel the task (same as dropping it)
    pub fn cancel(self) {}
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
