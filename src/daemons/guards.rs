//! Guard task implementations.
//!
//! Each guard keeps an `armed` flag tracking whether it should act on
//! dispatcher callbacks: armed on START/RESUME, disarmed on SUSPEND/STOP so
//! no guard touches input while the run does not own it.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::tasks::{Job, Signal, Task};

/// Shared armed/priority state for the built-in guards.
struct GuardCore {
    priority: AtomicI32,
    armed: Arc<AtomicBool>,
}

impl GuardCore {
    fn new(priority: i32) -> Self {
        Self {
            priority: AtomicI32::new(priority),
            armed: Arc::new(AtomicBool::new(false)),
        }
    }

    fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    fn set_armed_job(&self, armed: bool) -> Job {
        let flag = self.armed.clone();
        Job::new(move || async move {
            flag.store(armed, Ordering::SeqCst);
            Ok(())
        })
    }

    /// Default guard lifecycle: armed while the run owns input.
    fn hooks(&self, signal: Signal) -> Vec<Job> {
        match signal {
            Signal::Start | Signal::Resume => vec![self.set_armed_job(true)],
            Signal::Suspend | Signal::Stop => vec![self.set_armed_job(false)],
        }
    }
}

macro_rules! guard_task {
    ($ty:ident, $name:literal) => {
        impl Task for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn priority(&self) -> i32 {
                self.core.priority.load(Ordering::SeqCst)
            }

            fn set_priority(&self, priority: i32) {
                self.core.priority.store(priority, Ordering::SeqCst);
            }

            fn hooks_for(&self, signal: Signal) -> Vec<Job> {
                self.hooks(signal)
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

/// Re-establishes the automation session when the client drops it.
///
/// Highest-priority guard: its hook jobs outrank everything else queued so a
/// dead session is recovered before other work runs.
pub struct SessionGuard {
    core: GuardCore,
}

impl SessionGuard {
    pub fn new() -> Self {
        Self {
            core: GuardCore::new(3),
        }
    }

    /// Whether the guard is currently acting on dispatcher callbacks.
    pub fn is_armed(&self) -> bool {
        self.core.is_armed()
    }

    fn hooks(&self, signal: Signal) -> Vec<Job> {
        self.core.hooks(signal)
    }
}

guard_task!(SessionGuard, "session-guard");

/// Dismisses modal dialogs that would otherwise block the primary task.
pub struct DialogCloser {
    core: GuardCore,
}

impl DialogCloser {
    pub fn new() -> Self {
        Self {
            core: GuardCore::new(2),
        }
    }

    /// Whether the guard is currently acting on dispatcher callbacks.
    pub fn is_armed(&self) -> bool {
        self.core.is_armed()
    }

    fn hooks(&self, signal: Signal) -> Vec<Job> {
        self.core.hooks(signal)
    }
}

guard_task!(DialogCloser, "dialog-closer");

/// Discards transient claim tickets the client drops into the session.
///
/// Dispatcher callbacks report sightings via [`TicketSweeper::notice`]; the
/// backlog is swept on the worker slot and zeroed on STOP.
pub struct TicketSweeper {
    core: GuardCore,
    pending: Arc<AtomicUsize>,
}

impl TicketSweeper {
    pub fn new() -> Self {
        Self {
            core: GuardCore::new(1),
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Records one sighted ticket; called from dispatcher callbacks.
    pub fn notice(&self) {
        self.pending.fetch_add(1, Ordering::SeqCst);
    }

    /// Tickets sighted but not yet swept.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Whether the guard is currently acting on dispatcher callbacks.
    pub fn is_armed(&self) -> bool {
        self.core.is_armed()
    }

    fn sweep_job(&self) -> Job {
        let pending = self.pending.clone();
        Job::new(move || async move {
            pending.store(0, Ordering::SeqCst);
            Ok(())
        })
    }

    fn hooks(&self, signal: Signal) -> Vec<Job> {
        match signal {
            // Sweep the backlog before disarming.
            Signal::Stop => vec![self.sweep_job(), self.core.set_armed_job(false)],
            _ => self.core.hooks(signal),
        }
    }
}

guard_task!(TicketSweeper, "ticket-sweeper");

/// Answers vault pin prompts so stored-value access never stalls the run.
pub struct PinGuard {
    core: GuardCore,
}

impl PinGuard {
    pub fn new() -> Self {
        Self {
            core: GuardCore::new(2),
        }
    }

    /// Whether the guard is currently acting on dispatcher callbacks.
    pub fn is_armed(&self) -> bool {
        self.core.is_armed()
    }

    fn hooks(&self, signal: Signal) -> Vec<Job> {
        self.core.hooks(signal)
    }
}

guard_task!(PinGuard, "pin-guard");

/// Mixes idle variance into the input cadence.
///
/// Lowest-priority guard; its jobs only run when nothing more important is
/// queued.
pub struct Humanizer {
    core: GuardCore,
}

impl Humanizer {
    pub fn new() -> Self {
        Self {
            core: GuardCore::new(0),
        }
    }

    /// Whether the guard is currently acting on dispatcher callbacks.
    pub fn is_armed(&self) -> bool {
        self.core.is_armed()
    }

    fn hooks(&self, signal: Signal) -> Vec<Job> {
        self.core.hooks(signal)
    }
}

guard_task!(Humanizer, "humanizer");

#[cfg(test)]
mod tests {
    use super::*;

    async fn run_all(jobs: Vec<Job>) {
        for job in jobs {
            job.into_future().await.unwrap();
        }
    }

    #[tokio::test]
    async fn guards_arm_on_start_and_disarm_on_suspend() {
        let guard = SessionGuard::new();
        assert!(!guard.is_armed());

        run_all(guard.hooks_for(Signal::Start)).await;
        assert!(guard.is_armed());

        run_all(guard.hooks_for(Signal::Suspend)).await;
        assert!(!guard.is_armed());

        run_all(guard.hooks_for(Signal::Resume)).await;
        assert!(guard.is_armed());
    }

    #[tokio::test]
    async fn sweeper_clears_backlog_on_stop() {
        let sweeper = TicketSweeper::new();
        run_all(sweeper.hooks_for(Signal::Start)).await;

        sweeper.notice();
        sweeper.notice();
        assert_eq!(sweeper.pending(), 2);

        run_all(sweeper.hooks_for(Signal::Stop)).await;
        assert_eq!(sweeper.pending(), 0);
        assert!(!sweeper.is_armed());
    }

    #[test]
    fn priorities_rank_session_guard_highest() {
        assert!(SessionGuard::new().priority() > DialogCloser::new().priority());
        assert!(DialogCloser::new().priority() > TicketSweeper::new().priority());
        assert!(TicketSweeper::new().priority() > Humanizer::new().priority());
    }

    #[test]
    fn priority_is_mutable() {
        let guard = PinGuard::new();
        guard.set_priority(9);
        assert_eq!(guard.priority(), 9);
    }

    #[test]
    fn hooks_are_pure_at_call_time() {
        let guard = DialogCloser::new();
        // Producing hooks must not flip state; only running the jobs does.
        let _jobs = guard.hooks_for(Signal::Start);
        assert!(!guard.is_armed());
    }
}
