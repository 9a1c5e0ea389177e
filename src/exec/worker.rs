//! # Single-worker executor: the serialized execution slot.
//!
//! [`Executor`] owns the one worker task that drains the priority queue.
//! Every side-effecting operation in the system funnels through this slot, so
//! at most one job is ever active — the drain loop substitutes for locking
//! around shared external state.
//!
//! ## Drain semantics
//! The worker runs a persistent pop-and-run loop until the queue is closed
//! and empty. Shutdown is graceful and non-forcible: the in-flight job
//! completes, the backlog drains, new submissions are rejected.
//!
//! ## Failure isolation
//! A job that returns an error or panics is published to the bus as
//! [`EventKind::JobFailed`] and dropped; the drain continues. One misbehaving
//! hook cannot wedge the slot.

use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinHandle;

use crate::events::{Bus, Event, EventKind};

use super::queue::JobQueue;

/// Handle to the single-worker drain loop of one run.
pub(crate) struct Executor {
    queue: Arc<JobQueue>,
    _worker: JoinHandle<()>,
}

impl Executor {
    /// Spawns the worker over the given queue.
    pub fn spawn(queue: Arc<JobQueue>, bus: Bus) -> Self {
        let worker = tokio::spawn(drain(queue.clone(), bus));
        Self {
            queue,
            _worker: worker,
        }
    }

    /// Returns the run's job queue.
    pub fn queue(&self) -> &Arc<JobQueue> {
        &self.queue
    }

    /// Graceful shutdown: reject new submissions and let the worker drain
    /// the backlog on its own.
    ///
    /// Deliberately does not join the worker — `stop()` may itself be
    /// running on the worker slot (a hook calling stop, the bootstrap abort
    /// path), and joining from there would deadlock the slot.
    pub fn shutdown(self) {
        self.queue.close();
    }
}

/// Persistent drain loop: pop-and-run until the queue closes and empties.
async fn drain(queue: Arc<JobQueue>, bus: Bus) {
    while let Some(job) = queue.pop().await {
        let fut = std::panic::AssertUnwindSafe(job.into_future()).catch_unwind();
        match fut.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                bus.publish(Event::new(EventKind::JobFailed).with_reason(err.as_message()));
            }
            Err(_panic) => {
                bus.publish(Event::new(EventKind::JobFailed).with_reason("job panicked"));
            }
        }
    }
}
