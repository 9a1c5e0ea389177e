//! # Watchdog: maximum run duration enforcement.
//!
//! Armed only when a positive timeout is configured at start. Sleeps for the
//! timeout plus a fixed 1s grace, then stops the run. Cancellation is a
//! `CancellationToken` trip — no polling; `stop()` cancels the pending sleep.
//! At most one watchdog exists per run; it holds only a weak reference to
//! the scheduler so an abandoned run cannot be kept alive by its own timer.

use std::sync::Weak;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event, EventKind};

use super::scheduler::Scheduler;

/// Fixed slack added on top of the configured timeout.
const GRACE: Duration = Duration::from_millis(1000);

/// Handle to the armed run-duration timer.
pub(crate) struct Watchdog {
    token: CancellationToken,
}

impl Watchdog {
    /// Arms the timer: after `timeout + 1s`, publish
    /// [`EventKind::WatchdogExpired`] and stop the run.
    pub fn arm(timeout: Duration, scheduler: Weak<Scheduler>, bus: Bus) -> Self {
        let token = CancellationToken::new();
        let tripped = token.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = tripped.cancelled() => {}
                _ = tokio::time::sleep(timeout + GRACE) => {
                    bus.publish(Event::new(EventKind::WatchdogExpired));
                    if let Some(scheduler) = scheduler.upgrade() {
                        scheduler.stop().await;
                    }
                }
            }
        });

        Self { token }
    }

    /// Disarms the timer; idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
