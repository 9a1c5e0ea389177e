//! # External task dispatcher.
//!
//! The dispatcher is the host-side event fan-out: tasks attached here receive
//! client callbacks (ticks, messages, UI changes) between lifecycle signals.
//! The scheduler attaches each task right after bootstrap and detaches every
//! task on stop; the dispatcher itself lives outside this crate.

use crate::tasks::TaskRef;

/// Host-side registry delivering client events to attached tasks.
pub trait Dispatch: Send + Sync + 'static {
    /// Registers a freshly bootstrapped task for event delivery.
    fn attach(&self, task: TaskRef);

    /// Removes a task from event delivery, by name.
    fn detach(&self, name: &str);
}

/// No-op dispatcher for embedders without an event fan-out.
#[derive(Debug, Default)]
pub struct NullDispatch;

impl Dispatch for NullDispatch {
    fn attach(&self, _task: TaskRef) {}

    fn detach(&self, _name: &str) {}
}
