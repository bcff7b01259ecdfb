//! Fixed-interval drivers
//!
//! Periodic work (the console's expiry scan) runs on a tokio interval owned
//! by a [`TickerHandle`]. Dropping the handle or calling
//! [`TickerHandle::cancel`] stops the task, so no timer outlives its owner.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Owner of a running periodic task
#[derive(Debug)]
pub struct TickerHandle {
    name: &'static str,
    task: JoinHandle<()>,
}

impl TickerHandle {
    /// Stop the task
    pub fn cancel(self) {
        // Drop does the work
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.task.abort();
        tracing::debug!("Ticker '{}' cancelled", self.name);
    }
}

/// Run `tick` every `period`, starting immediately
///
/// Missed ticks are skipped rather than replayed in a burst; each tick
/// should derive its state from the current time anyway.
pub fn spawn_ticker<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> TickerHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            tick().await;
        }
    });

    tracing::debug!("Ticker '{}' started every {:?}", name, period);
    TickerHandle { name, task }
}
