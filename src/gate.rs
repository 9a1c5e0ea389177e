//! # Input-exclusivity gate.
//!
//! While a run holds the gate, the embedding host must route input exclusively
//! to the automation (and keep the user's hands off it). The scheduler keeps
//! the gate state tracking the run state exactly: engaged while Running,
//! released while Suspended or NotStarted — otherwise exclusive ownership
//! leaks past the run.

use std::sync::atomic::{AtomicBool, Ordering};

/// Shared boolean gate controlling input exclusivity.
///
/// Implementations must be idempotent: the scheduler may engage an already
/// engaged gate (and release an already released one) during redundant
/// transitions.
pub trait Gate: Send + Sync + 'static {
    /// Claims exclusive input ownership for the run.
    fn engage(&self);

    /// Returns input ownership to the host.
    fn release(&self);

    /// Returns whether the run currently owns input.
    fn is_engaged(&self) -> bool;
}

/// Default in-process gate backed by an atomic flag.
#[derive(Debug, Default)]
pub struct InputGate {
    engaged: AtomicBool,
}

impl Gate for InputGate {
    fn engage(&self) {
        self.engaged.store(true, Ordering::SeqCst);
    }

    fn release(&self) {
        self.engaged.store(false, Ordering::SeqCst);
    }

    fn is_engaged(&self) -> bool {
        self.engaged.load(Ordering::SeqCst)
    }
}
