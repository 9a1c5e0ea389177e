//! # Run context: explicit handles to the host collaborators.
//!
//! [`Context`] replaces process-wide singleton access: the gate, dispatcher,
//! and telemetry sink are passed in once at build time and handed to task
//! factories at bootstrap. The caller owns their lifecycle; the scheduler
//! only drives their on/off state.

use std::sync::Arc;

use crate::dispatch::Dispatch;
use crate::gate::Gate;
use crate::tasks::Sandbox;
use crate::track::Track;

/// Collaborator handles shared by one scheduler and every task it boots.
#[derive(Clone)]
pub struct Context {
    /// Sandbox token primary factories must have been built under.
    pub sandbox: Sandbox,
    /// Input-exclusivity gate; engaged exactly while the run is Running.
    pub gate: Arc<dyn Gate>,
    /// Host event fan-out; tasks are attached after bootstrap, detached on stop.
    pub dispatch: Arc<dyn Dispatch>,
    /// Best-effort telemetry sink.
    pub track: Arc<dyn Track>,
}
