//! # Builder for constructing a scheduler with its collaborators.
//!
//! Every collaborator has a usable in-process default: an
//! [`InputGate`](crate::InputGate), a no-op dispatcher, a no-op telemetry
//! sink, and the standard daemon set. A fresh [`Sandbox`] token is allocated
//! unless the embedder supplies the one its factories were built under.

use std::sync::Arc;

use crate::config::Config;
use crate::daemons::DaemonSet;
use crate::dispatch::{Dispatch, NullDispatch};
use crate::events::Bus;
use crate::gate::{Gate, InputGate};
use crate::tasks::Sandbox;
use crate::track::{NoopTrack, Track};

use super::context::Context;
use super::scheduler::Scheduler;

/// Builder returned by [`Scheduler::builder`].
pub struct SchedulerBuilder {
    cfg: Config,
    daemons: DaemonSet,
    sandbox: Sandbox,
    gate: Arc<dyn Gate>,
    dispatch: Arc<dyn Dispatch>,
    track: Arc<dyn Track>,
}

impl SchedulerBuilder {
    /// Creates a new builder with the given configuration and default
    /// collaborators.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            daemons: DaemonSet::standard(),
            sandbox: Sandbox::new(),
            gate: Arc::new(InputGate::default()),
            dispatch: Arc::new(NullDispatch),
            track: Arc::new(NoopTrack),
        }
    }

    /// Replaces the daemon set booted ahead of the primary task.
    pub fn with_daemons(mut self, daemons: DaemonSet) -> Self {
        self.daemons = daemons;
        self
    }

    /// Uses an existing sandbox token instead of allocating a fresh one.
    pub fn with_sandbox(mut self, sandbox: Sandbox) -> Self {
        self.sandbox = sandbox;
        self
    }

    /// Sets the input-exclusivity gate shared with the host.
    pub fn with_gate(mut self, gate: Arc<dyn Gate>) -> Self {
        self.gate = gate;
        self
    }

    /// Sets the host event dispatcher tasks are attached to.
    pub fn with_dispatch(mut self, dispatch: Arc<dyn Dispatch>) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Sets the telemetry sink.
    pub fn with_track(mut self, track: Arc<dyn Track>) -> Self {
        self.track = track;
        self
    }

    /// Builds and returns the scheduler.
    pub fn build(self) -> Arc<Scheduler> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let ctx = Arc::new(Context {
            sandbox: self.sandbox,
            gate: self.gate,
            dispatch: self.dispatch,
            track: self.track,
        });
        Arc::new(Scheduler::new_internal(self.cfg, ctx, bus, self.daemons))
    }
}
