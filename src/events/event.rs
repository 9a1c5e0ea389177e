//! # Runtime events emitted by the scheduler, worker, and watchdog.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Run lifecycle**: start, suspend, resume, stop of the whole run
//! - **Task registry**: attach/detach of daemons and the primary task
//! - **Faults**: bootstrap failures, isolated job failures, watchdog expiry
//!
//! The [`Event`] struct carries optional metadata such as the task name, a
//! failure reason, and the broadcast signal.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use crate::tasks::Signal;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Run lifecycle ===
    /// A run was started: executor created, bootstrap jobs enqueued.
    ///
    /// Sets: `at`, `seq`.
    RunStarted,

    /// The run entered suspension; the idle job will occupy the worker slot.
    ///
    /// Sets: `at`, `seq`.
    RunSuspended,

    /// The run resumed from suspension.
    ///
    /// Sets: `at`, `seq`.
    RunResumed,

    /// The run finished teardown; the scheduler is ready for a new start.
    ///
    /// Sets: `at`, `seq`.
    RunStopped,

    /// A lifecycle signal was broadcast to the active tasks.
    ///
    /// Sets: `signal`, `at`, `seq`.
    SignalBroadcast,

    // === Task registry ===
    /// A task was instantiated and registered into the active set.
    ///
    /// Sets: `task`, `at`, `seq`.
    TaskAttached,

    /// A task was removed from the active set during stop.
    ///
    /// Sets: `task`, `at`, `seq`.
    TaskDetached,

    // === Faults ===
    /// A daemon or the primary task failed to instantiate; the run aborts.
    ///
    /// Sets: `task` (kind identifier), `reason`, `at`, `seq`.
    BootstrapFailed,

    /// A job failed or panicked; it was dropped and the drain continued.
    ///
    /// Sets: `reason`, `at`, `seq`.
    JobFailed,

    /// The watchdog expired and is stopping the run.
    ///
    /// Sets: `at`, `seq`.
    WatchdogExpired,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the task, if applicable.
    pub task: Option<Arc<str>>,
    /// Human-readable reason (errors, abort details).
    pub reason: Option<Arc<str>>,
    /// Broadcast signal, for [`EventKind::SignalBroadcast`].
    pub signal: Option<Signal>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            reason: None,
            signal: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the broadcast signal.
    #[inline]
    pub fn with_signal(mut self, signal: Signal) -> Self {
        self.signal = Some(signal);
        self
    }
}
