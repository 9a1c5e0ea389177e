//! # Task abstraction and lifecycle signals.
//!
//! This module defines the [`Task`] trait — a unit of automation logic with a
//! mutable integer priority and per-signal lifecycle hooks — and the
//! [`Signal`] enum broadcast to every active task. The common handle type is
//! [`TaskRef`], an `Arc<dyn Task>` suitable for sharing across the runtime.
//!
//! Hooks are **pure at call time**: `hooks_for` must only *produce* jobs; all
//! side effects happen later, when the worker runs those jobs on the single
//! execution slot.

use std::sync::Arc;

use crate::tasks::Job;

/// Lifecycle signal broadcast to every active task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// The run has started; daemons and the primary task are registered.
    Start,
    /// The run is entering suspension; produce cleanup work now.
    Suspend,
    /// The run is leaving suspension.
    Resume,
    /// The run is stopping; produce final teardown work.
    Stop,
}

impl Signal {
    /// Telemetry action segment for this signal.
    ///
    /// START emits an empty segment; the others map to
    /// `pause`/`resume`/`stop`.
    pub fn action(&self) -> &'static str {
        match self {
            Signal::Start => "",
            Signal::Suspend => "pause",
            Signal::Resume => "resume",
            Signal::Stop => "stop",
        }
    }
}

/// # Unit of automation logic under scheduler control.
///
/// A `Task` has a stable [`name`](Task::name), a mutable integer
/// [`priority`](Task::priority) inherited by the jobs its hooks produce, and
/// a pure [`hooks_for`](Task::hooks_for) that maps a lifecycle signal to the
/// jobs to run on the worker slot.
///
/// Tasks are constructed by a factory during bootstrap, held in the active
/// set for the duration of one run, and dropped on stop. After bootstrap a
/// task is only touched by the single worker, so implementations keep
/// interior state in atomics rather than locks.
///
/// # Example
/// ```
/// use std::sync::atomic::{AtomicI32, Ordering};
/// use scriptvisor::{Job, Signal, Task};
///
/// struct Probe {
///     priority: AtomicI32,
/// }
///
/// impl Task for Probe {
///     fn name(&self) -> &str {
///         "probe"
///     }
///
///     fn priority(&self) -> i32 {
///         self.priority.load(Ordering::Relaxed)
///     }
///
///     fn set_priority(&self, priority: i32) {
///         self.priority.store(priority, Ordering::Relaxed);
///     }
///
///     fn hooks_for(&self, signal: Signal) -> Vec<Job> {
///         match signal {
///             Signal::Start => vec![Job::new(|| async { Ok(()) })],
///             _ => Vec::new(),
///         }
///     }
/// }
/// ```
pub trait Task: Send + Sync + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Returns the task's current priority.
    ///
    /// Jobs produced by [`hooks_for`](Task::hooks_for) inherit this value at
    /// broadcast time.
    fn priority(&self) -> i32;

    /// Updates the task's priority for subsequently produced jobs.
    fn set_priority(&self, priority: i32);

    /// Produces the jobs to run for the given lifecycle signal.
    ///
    /// Must be free of side effects at call time.
    fn hooks_for(&self, signal: Signal) -> Vec<Job>;
}

/// Shared handle to a task.
pub type TaskRef = Arc<dyn Task>;
