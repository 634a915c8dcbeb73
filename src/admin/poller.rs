//! Periodic refresh task
//!
//! Runs a tick callback on a fixed interval until the callback asks to stop
//! or the handle is dropped.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// What the poller does after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PollControl {
    Continue,
    Stop,
}

/// Owns the background task. Dropping it aborts the task.
#[derive(Debug)]
pub(crate) struct PollHandle {
    handle: JoinHandle<()>,
}

impl PollHandle {
    /// Whether the task is still scheduled
    pub(crate) fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawn a poller. The first tick fires one full interval after spawning.
pub(crate) fn spawn<F, Fut>(interval: Duration, mut tick: F) -> PollHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = PollControl> + Send + 'static,
{
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Skip the first immediate tick
        ticker.tick().await;

        loop {
            ticker.tick().await;

            if tick().await == PollControl::Stop {
                break;
            }
        }

        tracing::debug!("Poller stopped");
    });

    PollHandle { handle }
}
