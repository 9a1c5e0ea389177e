//! # Built-in guard daemons and the daemon registry.
//!
//! Every run boots a fixed, ordered set of always-on guard tasks before the
//! user's primary task, so guard logic (session recovery, prompt handling)
//! is installed first. The set is identical across runs.
//!
//! Daemons are registered **by capability**: a kind identifier mapped to a
//! factory returning a [`TaskRef`], never a concrete type reference. The
//! [`DaemonSet::standard`] order is part of the contract:
//!
//! 1. `session-guard` — re-establishes the session when it drops
//! 2. `dialog-closer` — dismisses blocking dialogs
//! 3. `ticket-sweeper` — discards transient claim tickets
//! 4. `pin-guard` — answers vault pin prompts
//! 5. `humanizer` — mixes idle variance into input cadence
//!
//! The guards' event-driven work is delivered through the external
//! [`Dispatch`](crate::Dispatch) registry; here they only maintain their
//! armed state across lifecycle signals.

mod guards;

use std::sync::Arc;

use crate::core::Context;
use crate::error::RuntimeError;
use crate::tasks::TaskRef;

pub use guards::{DialogCloser, Humanizer, PinGuard, SessionGuard, TicketSweeper};

/// Constructor for one daemon, invoked against the run context at bootstrap.
pub type DaemonFactory = Arc<dyn Fn(&Context) -> Result<TaskRef, RuntimeError> + Send + Sync>;

/// Fixed, ordered list of daemon factories for a scheduler.
#[derive(Clone, Default)]
pub struct DaemonSet {
    factories: Vec<(&'static str, DaemonFactory)>,
}

impl DaemonSet {
    /// The built-in guard set, in bootstrap order.
    pub fn standard() -> Self {
        Self::empty()
            .register("session-guard", |_| Ok(Arc::new(SessionGuard::new()) as TaskRef))
            .register("dialog-closer", |_| Ok(Arc::new(DialogCloser::new()) as TaskRef))
            .register("ticket-sweeper", |_| {
                Ok(Arc::new(TicketSweeper::new()) as TaskRef)
            })
            .register("pin-guard", |_| Ok(Arc::new(PinGuard::new()) as TaskRef))
            .register("humanizer", |_| Ok(Arc::new(Humanizer::new()) as TaskRef))
    }

    /// An empty set, for embedders that bring their own guards.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Appends a daemon factory; order of registration is bootstrap order.
    pub fn register<F>(mut self, kind: &'static str, make: F) -> Self
    where
        F: Fn(&Context) -> Result<TaskRef, RuntimeError> + Send + Sync + 'static,
    {
        self.factories.push((kind, Arc::new(make)));
        self
    }

    /// Number of registered daemons.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &(&'static str, DaemonFactory)> {
        self.factories.iter()
    }
}
