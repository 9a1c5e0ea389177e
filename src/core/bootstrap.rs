//! # Bootstrap jobs: instantiate and register the run's tasks.
//!
//! One bootstrap job per daemon (fixed order), then one for the primary
//! task, all at neutral priority so they drain FIFO ahead of the START
//! broadcast. Each job instantiates its task through the factory against the
//! run [`Context`](super::Context), registers it into the active set and the
//! external dispatcher, and — for the primary — records the instance into
//! the bundle.
//!
//! ## Failure policy
//! An instantiation failure aborts the entire run: the error is published as
//! [`EventKind::BootstrapFailed`](crate::EventKind::BootstrapFailed) and
//! `stop()` is invoked. No retry, no isolation to the failing task — a run
//! without its guards is not worth continuing.

use std::sync::Weak;

use crate::daemons::DaemonFactory;
use crate::error::RuntimeError;
use crate::events::{Event, EventKind};
use crate::tasks::{Bundle, Job};

use super::scheduler::Scheduler;

/// Builds the bootstrap job for one daemon.
pub(crate) fn daemon(scheduler: Weak<Scheduler>, kind: &'static str, make: DaemonFactory) -> Job {
    Job::new(move || async move {
        let Some(scheduler) = scheduler.upgrade() else {
            return Ok(());
        };
        // A stop racing the bootstrap chain must not resurrect tasks.
        if !scheduler.is_valid() {
            return Ok(());
        }
        match make(scheduler.context()) {
            Ok(task) => {
                scheduler.attach(task).await;
            }
            Err(err) => {
                abort(&scheduler, kind, err).await;
            }
        }
        Ok(())
    })
}

/// Builds the bootstrap job for the primary task.
pub(crate) fn primary(scheduler: Weak<Scheduler>, bundle: Bundle) -> Job {
    Job::new(move || async move {
        let Some(scheduler) = scheduler.upgrade() else {
            return Ok(());
        };
        if !scheduler.is_valid() {
            return Ok(());
        }
        let factory = bundle.factory();
        match factory.make(scheduler.context()) {
            Ok(task) => {
                bundle.set_instance(task.clone());
                scheduler.attach(task).await;
            }
            Err(err) => {
                let kind = factory.kind().to_string();
                abort(&scheduler, &kind, err).await;
            }
        }
        Ok(())
    })
}

async fn abort(scheduler: &std::sync::Arc<Scheduler>, kind: &str, err: RuntimeError) {
    scheduler.bus().publish(
        Event::new(EventKind::BootstrapFailed)
            .with_task(kind)
            .with_reason(err.as_message()),
    );
    scheduler.stop().await;
}
