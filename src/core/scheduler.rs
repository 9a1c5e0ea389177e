//! # Scheduler: the run state machine and lifecycle orchestrator.
//!
//! The [`Scheduler`] owns the transition flags, the active-task set, and the
//! executor of the current run. Control operations run on caller tasks and
//! are safe under concurrent invocation: every transition is a single
//! compare-and-set, the first caller wins, redundant calls are no-ops.
//!
//! ## State machine
//! ```text
//!                 start()                    stop()
//! NotStarted ──────────────► Running ──────────────────► Stopping
//!     ▲                      │    ▲                          │
//!     │             suspend()│    │resume()                  │ teardown
//!     │                      ▼    │                          │ complete
//!     │                     Suspended ───── stop() ────┐     │
//!     └────────────────────────────────────────────────┴─────┘
//! ```
//!
//! `start()` is a no-op outside NotStarted; `stop()` is a no-op in
//! NotStarted. `is_valid()` holds exactly while started ∧ ¬stopping.
//!
//! ## Wiring
//! ```text
//! caller ── start() ──► [bootstrap jobs │ primary job │ START job] ──► queue
//!                                                                       │
//! caller ── suspend()/resume()/stop() ── call(signal) ── hook jobs ─────┤
//!                                                                       ▼
//!                                                            single worker slot
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use tokio::sync::Mutex as AsyncMutex;

use crate::config::Config;
use crate::daemons::DaemonSet;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::exec::{Executor, JobQueue};
use crate::tasks::{Bundle, Job, Sandbox, Signal, TaskRef};

use super::bootstrap;
use super::builder::SchedulerBuilder;
use super::context::Context;
use super::watchdog::Watchdog;

/// Observable run state, derived from the three transition flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No run active; `start()` will begin one.
    NotStarted,
    /// A run is active and owns input.
    Running,
    /// A run is active but parked on the idle job; input is released.
    Suspended,
    /// Teardown in progress.
    Stopping,
}

/// Coordinates one automation run: daemons plus the primary task, serialized
/// through a single worker slot.
pub struct Scheduler {
    cfg: Config,
    ctx: Arc<Context>,
    bus: Bus,
    daemons: DaemonSet,

    bundle: OnceLock<Bundle>,

    started: AtomicBool,
    suspended: AtomicBool,
    stopping: AtomicBool,

    /// Active tasks in registration order (daemons first, primary last).
    tasks: AsyncMutex<Vec<TaskRef>>,
    executor: AsyncMutex<Option<Executor>>,
    watchdog: Mutex<Option<Watchdog>>,
}

impl Scheduler {
    /// Returns a builder seeded with the given configuration.
    pub fn builder(cfg: Config) -> SchedulerBuilder {
        SchedulerBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        ctx: Arc<Context>,
        bus: Bus,
        daemons: DaemonSet,
    ) -> Self {
        Self {
            cfg,
            ctx,
            bus,
            daemons,
            bundle: OnceLock::new(),
            started: AtomicBool::new(false),
            suspended: AtomicBool::new(false),
            stopping: AtomicBool::new(false),
            tasks: AsyncMutex::new(Vec::new()),
            executor: AsyncMutex::new(None),
            watchdog: Mutex::new(None),
        }
    }

    /// Sets the primary-task bundle for subsequent runs.
    ///
    /// The bundle is immutable after set; a second call fails with
    /// [`RuntimeError::BundleAlreadySet`].
    pub fn set_bundle(&self, bundle: Bundle) -> Result<(), RuntimeError> {
        self.bundle
            .set(bundle)
            .map_err(|_| RuntimeError::BundleAlreadySet)
    }

    /// Returns the bundle, if one was set.
    pub fn bundle(&self) -> Option<Bundle> {
        self.bundle.get().cloned()
    }

    /// Returns the sandbox token primary factories must be built under.
    pub fn sandbox(&self) -> Sandbox {
        self.ctx.sandbox
    }

    /// Returns the collaborator context handed to task factories.
    pub fn context(&self) -> &Arc<Context> {
        &self.ctx
    }

    /// Returns the event bus; subscribe for run observability.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// True while a run is active: started ∧ ¬stopping.
    pub fn is_valid(&self) -> bool {
        self.started.load(Ordering::SeqCst) && !self.stopping.load(Ordering::SeqCst)
    }

    /// Direct read of the stopping flag.
    pub fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::SeqCst)
    }

    /// Direct read of the suspended flag.
    pub fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::SeqCst)
    }

    /// Derives the observable run state from the transition flags.
    pub fn state(&self) -> SchedulerState {
        if self.stopping.load(Ordering::SeqCst) {
            return SchedulerState::Stopping;
        }
        if !self.started.load(Ordering::SeqCst) {
            return SchedulerState::NotStarted;
        }
        if self.suspended.load(Ordering::SeqCst) {
            SchedulerState::Suspended
        } else {
            SchedulerState::Running
        }
    }

    /// Names of the active tasks, in registration order.
    pub async fn active_tasks(&self) -> Vec<String> {
        self.tasks
            .lock()
            .await
            .iter()
            .map(|task| task.name().to_string())
            .collect()
    }

    /// Begins a run.
    ///
    /// Idempotent: only the first caller past the started flag proceeds;
    /// concurrent and repeated calls are no-ops. Validation (bundle present,
    /// sandbox match) happens before any state change, so a failed call
    /// leaves the scheduler untouched.
    pub async fn start(self: &Arc<Self>) -> Result<(), RuntimeError> {
        let bundle = self.bundle().ok_or(RuntimeError::BundleMissing)?;
        if bundle.factory().sandbox() != self.ctx.sandbox {
            return Err(RuntimeError::SandboxMismatch);
        }

        // Teardown of the previous run is still resetting flags; treat as
        // not-yet-startable rather than racing it.
        if self.stopping.load(Ordering::SeqCst) {
            return Ok(());
        }
        if self
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Ok(());
        }

        bundle.clear_instance();
        self.ctx.gate.engage();

        let queue = Arc::new(JobQueue::new());
        for &(kind, ref make) in self.daemons.iter() {
            queue
                .offer(bootstrap::daemon(Arc::downgrade(self), kind, make.clone()))
                .await;
        }
        queue
            .offer(bootstrap::primary(Arc::downgrade(self), bundle.clone()))
            .await;

        let broadcaster = Arc::downgrade(self);
        queue
            .offer(Job::new(move || async move {
                if let Some(scheduler) = broadcaster.upgrade() {
                    scheduler.call(Signal::Start).await;
                }
                Ok(())
            }))
            .await;

        *self.executor.lock().await = Some(Executor::spawn(queue, self.bus.clone()));

        if let Some(timeout) = self.cfg.watchdog_timeout() {
            if let Ok(mut slot) = self.watchdog.lock() {
                *slot = Some(Watchdog::arm(
                    timeout,
                    Arc::downgrade(self),
                    self.bus.clone(),
                ));
            }
        }

        self.bus.publish(Event::new(EventKind::RunStarted));
        Ok(())
    }

    /// Ends the current run.
    ///
    /// Idempotent: requires started ∧ a false→true flip of the stopping
    /// flag; every other caller returns immediately. Cancels the watchdog,
    /// broadcasts STOP, detaches every task from the dispatcher, shuts the
    /// executor down gracefully, releases the gate, and resets the flags so
    /// a future `start()` can begin a new run.
    pub async fn stop(self: &Arc<Self>) {
        if !(self.started.load(Ordering::SeqCst)
            && self
                .stopping
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok())
        {
            return;
        }

        if let Ok(mut slot) = self.watchdog.lock() {
            if let Some(watchdog) = slot.take() {
                watchdog.cancel();
            }
        }

        self.call(Signal::Stop).await;

        let drained: Vec<TaskRef> = {
            let mut tasks = self.tasks.lock().await;
            tasks.drain(..).collect()
        };
        for task in &drained {
            self.ctx.dispatch.detach(task.name());
            self.bus
                .publish(Event::new(EventKind::TaskDetached).with_task(task.name()));
        }

        if let Some(executor) = self.executor.lock().await.take() {
            executor.shutdown();
        }

        self.ctx.gate.release();
        self.bus.publish(Event::new(EventKind::RunStopped));

        // started drops before stopping so is_valid() never flickers true
        // mid-reset.
        self.suspended.store(false, Ordering::SeqCst);
        self.started.store(false, Ordering::SeqCst);
        self.stopping.store(false, Ordering::SeqCst);
    }

    /// Parks the run on the idle job and releases input ownership.
    ///
    /// Effective only on the false→true transition of the suspended flag and
    /// only while a run is active; otherwise a no-op.
    pub async fn suspend(self: &Arc<Self>) {
        if !self.is_valid() {
            return;
        }
        if self
            .suspended
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            self.call(Signal::Suspend).await;
            self.ctx.gate.release();
            self.bus.publish(Event::new(EventKind::RunSuspended));
        }
    }

    /// Clears the suspension and re-claims input ownership.
    ///
    /// Effective only on the true→false transition of the suspended flag;
    /// otherwise a no-op.
    pub async fn resume(self: &Arc<Self>) {
        if !self.is_valid() {
            return;
        }
        if self
            .suspended
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            self.call(Signal::Resume).await;
            self.ctx.gate.engage();
            self.bus.publish(Event::new(EventKind::RunResumed));
        }
    }

    /// Enqueues an externally created job into the current run's queue.
    ///
    /// Returns `false` when no run is active.
    pub async fn offer(&self, job: Job) -> bool {
        if !self.is_valid() {
            return false;
        }
        let queue = match self.executor.lock().await.as_ref() {
            Some(executor) => executor.queue().clone(),
            None => return false,
        };
        queue.offer(job).await
    }

    /// Registers a freshly bootstrapped task into the active set and the
    /// external dispatcher.
    pub(crate) async fn attach(&self, task: TaskRef) {
        self.tasks.lock().await.push(task.clone());
        self.ctx.dispatch.attach(task.clone());
        self.bus
            .publish(Event::new(EventKind::TaskAttached).with_task(task.name()));
    }

    /// Broadcasts a lifecycle signal: telemetry, then one batch of hook jobs
    /// per active task in registration order.
    ///
    /// Hook jobs inherit the owning task's current priority. For SUSPEND the
    /// idle job goes in below every task priority, so queued cleanup work
    /// runs before the sleep loop takes the slot.
    pub(crate) async fn call(self: &Arc<Self>, signal: Signal) {
        self.track(signal);
        self.bus
            .publish(Event::new(EventKind::SignalBroadcast).with_signal(signal));

        let queue = match self.executor.lock().await.as_ref() {
            Some(executor) => executor.queue().clone(),
            None => return,
        };

        let tasks: Vec<TaskRef> = self.tasks.lock().await.clone();
        for task in &tasks {
            let priority = task.priority();
            for mut job in task.hooks_for(signal) {
                job.set_priority(priority);
                queue.offer(job).await;
            }
        }

        if signal == Signal::Suspend {
            queue.offer(self.idle_job()).await;
        }
    }

    /// The suspension idle job: occupies the sole worker slot, waking at the
    /// configured interval to re-check the suspended flag.
    fn idle_job(self: &Arc<Self>) -> Job {
        let weak = Arc::downgrade(self);
        let interval = self.cfg.poll_interval;
        Job::with_priority(i32::MIN, move || async move {
            loop {
                match weak.upgrade() {
                    Some(scheduler) if scheduler.is_suspended() && !scheduler.is_stopping() => {}
                    _ => break,
                }
                tokio::time::sleep(interval).await;
            }
            Ok(())
        })
    }

    /// Fire-and-forget telemetry for one signal.
    ///
    /// Skipped when the definition has no name, or is remote without a
    /// usable id.
    fn track(&self, signal: Signal) {
        let Some(bundle) = self.bundle() else {
            return;
        };
        let definition = bundle.definition().clone();
        let Some(id) = definition.track_id() else {
            return;
        };
        let page = format!("scripts/{id}/{}", signal.action());
        let label = definition.name.clone().unwrap_or_default();
        let sink = self.ctx.track.clone();
        tokio::spawn(async move {
            sink.track(&page, &label).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemons::DaemonSet;
    use crate::gate::{Gate, InputGate};
    use crate::tasks::{Definition, Task, TaskFactory};
    use crate::track::Track;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicI32, AtomicUsize};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    /// Test task: counts how many of its hook jobs actually ran.
    struct Probe {
        name: &'static str,
        priority: AtomicI32,
        hook_runs: Arc<AtomicUsize>,
    }

    impl Probe {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                priority: AtomicI32::new(0),
                hook_runs: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl Task for Probe {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority.load(Ordering::SeqCst)
        }

        fn set_priority(&self, priority: i32) {
            self.priority.store(priority, Ordering::SeqCst);
        }

        fn hooks_for(&self, _signal: Signal) -> Vec<Job> {
            let runs = self.hook_runs.clone();
            vec![Job::new(move || async move {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })]
        }
    }

    #[derive(Default)]
    struct Recording {
        pages: StdMutex<Vec<(String, String)>>,
    }

    impl Recording {
        fn pages(&self) -> Vec<(String, String)> {
            self.pages.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Track for Recording {
        async fn track(&self, path: &str, label: &str) {
            self.pages
                .lock()
                .unwrap()
                .push((path.to_string(), label.to_string()));
        }
    }

    fn local_definition(name: &str) -> Definition {
        Definition {
            id: None,
            name: Some(name.to_string()),
            is_local: true,
        }
    }

    fn primary_bundle(scheduler: &Scheduler, name: &'static str) -> Bundle {
        let factory = TaskFactory::new(name, scheduler.sandbox(), move |_| {
            Ok(Arc::new(Probe::new(name)) as TaskRef)
        });
        Bundle::new(factory, local_definition(name))
    }

    /// Barrier: resolves once everything queued at task priority has run.
    async fn settle(scheduler: &Arc<Scheduler>) {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let accepted = scheduler
            .offer(Job::with_priority(i32::MIN, move || async move {
                let _ = tx.send(());
                Ok(())
            }))
            .await;
        assert!(accepted, "offer should be accepted while the run is active");
        tokio::time::timeout(Duration::from_secs(5), rx)
            .await
            .expect("worker should drain")
            .unwrap();
    }

    async fn wait_until(mut cond: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !cond() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    #[tokio::test]
    async fn scenario_a_start_without_bundle_fails() {
        let scheduler = Scheduler::builder(Config::default()).build();

        let err = scheduler.start().await.unwrap_err();
        assert!(matches!(err, RuntimeError::BundleMissing));
        assert!(!scheduler.is_valid());
        assert_eq!(scheduler.state(), SchedulerState::NotStarted);

        // Retry succeeds once the bundle is set.
        scheduler
            .set_bundle(primary_bundle(&scheduler, "miner"))
            .unwrap();
        scheduler.start().await.unwrap();
        assert!(scheduler.is_valid());
        scheduler.stop().await;
    }

    #[tokio::test]
    async fn sandbox_mismatch_aborts_before_any_state_change() {
        let gate = Arc::new(InputGate::default());
        let scheduler = Scheduler::builder(Config::default())
            .with_gate(gate.clone())
            .build();

        let foreign = TaskFactory::new("foreign", Sandbox::new(), |_| {
            Ok(Arc::new(Probe::new("foreign")) as TaskRef)
        });
        scheduler
            .set_bundle(Bundle::new(foreign, local_definition("foreign")))
            .unwrap();

        let err = scheduler.start().await.unwrap_err();
        assert!(matches!(err, RuntimeError::SandboxMismatch));
        assert!(!scheduler.is_valid());
        assert!(!gate.is_engaged());
        assert!(!scheduler.offer(Job::new(|| async { Ok(()) })).await);
    }

    #[tokio::test]
    async fn scenario_b_standard_daemons_precede_primary() {
        let scheduler = Scheduler::builder(Config::default())
            .with_daemons(DaemonSet::standard())
            .build();
        scheduler
            .set_bundle(primary_bundle(&scheduler, "miner"))
            .unwrap();

        scheduler.start().await.unwrap();
        settle(&scheduler).await;

        let active = scheduler.active_tasks().await;
        assert_eq!(active.len(), 6);
        assert_eq!(active.first().map(String::as_str), Some("session-guard"));
        assert_eq!(active.last().map(String::as_str), Some("miner"));

        scheduler.stop().await;
        assert!(scheduler.active_tasks().await.is_empty());
        assert!(!scheduler.is_valid());
    }

    #[tokio::test]
    async fn p1_is_valid_tracks_started_and_not_stopping() {
        let scheduler = Scheduler::builder(Config::default()).build();
        scheduler
            .set_bundle(primary_bundle(&scheduler, "miner"))
            .unwrap();

        assert!(!scheduler.is_valid());
        assert_eq!(scheduler.state(), SchedulerState::NotStarted);

        scheduler.start().await.unwrap();
        assert!(scheduler.is_valid());
        assert_eq!(scheduler.state(), SchedulerState::Running);

        scheduler.suspend().await;
        assert!(scheduler.is_valid());
        assert!(scheduler.is_suspended());
        assert_eq!(scheduler.state(), SchedulerState::Suspended);

        scheduler.resume().await;
        assert_eq!(scheduler.state(), SchedulerState::Running);

        scheduler.stop().await;
        assert!(!scheduler.is_valid());
        assert!(!scheduler.is_stopping());
        assert_eq!(scheduler.state(), SchedulerState::NotStarted);
    }

    #[tokio::test]
    async fn p2_concurrent_starts_bootstrap_once() {
        let instantiations = Arc::new(AtomicUsize::new(0));
        let counter = instantiations.clone();
        let daemons = DaemonSet::empty().register("counting-guard", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Probe::new("counting-guard")) as TaskRef)
        });

        let scheduler = Scheduler::builder(Config::default())
            .with_daemons(daemons)
            .build();
        scheduler
            .set_bundle(primary_bundle(&scheduler, "miner"))
            .unwrap();

        let a = {
            let scheduler = scheduler.clone();
            tokio::spawn(async move { scheduler.start().await })
        };
        let b = {
            let scheduler = scheduler.clone();
            tokio::spawn(async move { scheduler.start().await })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        settle(&scheduler).await;
        assert_eq!(instantiations.load(Ordering::SeqCst), 1);
        assert_eq!(
            scheduler.active_tasks().await,
            vec!["counting-guard".to_string(), "miner".to_string()]
        );
        scheduler.stop().await;
    }

    #[tokio::test]
    async fn p4_suspend_resume_preserves_tasks_and_gate() {
        let gate = Arc::new(InputGate::default());
        let scheduler = Scheduler::builder(Config::default())
            .with_gate(gate.clone())
            .build();
        scheduler
            .set_bundle(primary_bundle(&scheduler, "miner"))
            .unwrap();

        scheduler.start().await.unwrap();
        settle(&scheduler).await;
        assert!(gate.is_engaged());
        let before = scheduler.active_tasks().await;

        scheduler.suspend().await;
        assert!(!gate.is_engaged());
        assert_eq!(scheduler.state(), SchedulerState::Suspended);

        scheduler.resume().await;
        assert!(gate.is_engaged());
        assert_eq!(scheduler.state(), SchedulerState::Running);
        assert_eq!(scheduler.active_tasks().await, before);

        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn scenario_c_offered_job_waits_for_resume() {
        let scheduler = Scheduler::builder(Config::default()).build();
        scheduler
            .set_bundle(primary_bundle(&scheduler, "miner"))
            .unwrap();
        scheduler.start().await.unwrap();
        settle(&scheduler).await;

        scheduler.suspend().await;
        // Let the worker drain the suspend hooks and park on the idle job.
        tokio::time::sleep(Duration::from_millis(100)).await;

        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        assert!(
            scheduler
                .offer(Job::new(move || async move {
                    flag.store(true, Ordering::SeqCst);
                    Ok(())
                }))
                .await
        );

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(
            !ran.load(Ordering::SeqCst),
            "job must not run while suspended"
        );

        scheduler.resume().await;
        let flag = ran.clone();
        wait_until(move || flag.load(Ordering::SeqCst)).await;
        scheduler.stop().await;
    }

    #[tokio::test]
    async fn p5_stop_mid_suspension_clears_everything() {
        let gate = Arc::new(InputGate::default());
        let scheduler = Scheduler::builder(Config::default())
            .with_gate(gate.clone())
            .build();
        scheduler
            .set_bundle(primary_bundle(&scheduler, "miner"))
            .unwrap();

        scheduler.start().await.unwrap();
        settle(&scheduler).await;
        scheduler.suspend().await;

        scheduler.stop().await;
        assert!(scheduler.active_tasks().await.is_empty());
        assert!(!scheduler.offer(Job::new(|| async { Ok(()) })).await);
        assert!(!gate.is_engaged());
        assert_eq!(scheduler.state(), SchedulerState::NotStarted);

        // The scheduler is reusable after teardown.
        scheduler.start().await.unwrap();
        settle(&scheduler).await;
        assert_eq!(scheduler.active_tasks().await.len(), 6);
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn p6_watchdog_stops_the_run() {
        let cfg = Config {
            timeout: Duration::from_millis(500),
            ..Config::default()
        };
        let scheduler = Scheduler::builder(cfg).build();
        scheduler
            .set_bundle(primary_bundle(&scheduler, "miner"))
            .unwrap();
        let mut events = scheduler.bus().subscribe();

        scheduler.start().await.unwrap();
        assert!(scheduler.is_valid());

        let probe = scheduler.clone();
        wait_until(move || probe.state() == SchedulerState::NotStarted).await;
        assert!(!scheduler.is_valid());

        let mut expired = false;
        while let Ok(ev) = events.try_recv() {
            expired |= ev.kind == EventKind::WatchdogExpired;
        }
        assert!(expired);
    }

    #[tokio::test(start_paused = true)]
    async fn watchdog_is_cancelled_by_manual_stop() {
        let cfg = Config {
            timeout: Duration::from_millis(500),
            ..Config::default()
        };
        let scheduler = Scheduler::builder(cfg).build();
        scheduler
            .set_bundle(primary_bundle(&scheduler, "miner"))
            .unwrap();
        let mut events = scheduler.bus().subscribe();

        scheduler.start().await.unwrap();
        scheduler.stop().await;

        tokio::time::sleep(Duration::from_secs(5)).await;
        while let Ok(ev) = events.try_recv() {
            assert_ne!(ev.kind, EventKind::WatchdogExpired);
        }
    }

    #[tokio::test]
    async fn bootstrap_failure_aborts_the_whole_run() {
        let daemons = DaemonSet::empty().register("broken-guard", |_| {
            Err(RuntimeError::Instantiation {
                task: "broken-guard".into(),
                reason: "no backend".into(),
            })
        });
        let scheduler = Scheduler::builder(Config::default())
            .with_daemons(daemons)
            .build();
        scheduler
            .set_bundle(primary_bundle(&scheduler, "miner"))
            .unwrap();
        let mut events = scheduler.bus().subscribe();

        scheduler.start().await.unwrap();
        let probe = scheduler.clone();
        wait_until(move || probe.state() == SchedulerState::NotStarted).await;

        assert!(!scheduler.is_valid());
        assert!(scheduler.active_tasks().await.is_empty());

        let mut aborted = false;
        while let Ok(ev) = events.try_recv() {
            if ev.kind == EventKind::BootstrapFailed {
                aborted = true;
                assert_eq!(ev.task.as_deref(), Some("broken-guard"));
            }
        }
        assert!(aborted);
    }

    #[tokio::test]
    async fn failing_hook_does_not_wedge_the_run() {
        use crate::error::TaskError;

        struct Hostile;

        impl Task for Hostile {
            fn name(&self) -> &str {
                "hostile"
            }

            fn priority(&self) -> i32 {
                0
            }

            fn set_priority(&self, _priority: i32) {}

            fn hooks_for(&self, _signal: Signal) -> Vec<Job> {
                vec![Job::new(|| async {
                    Err(TaskError::Fail {
                        error: "hook exploded".into(),
                    })
                })]
            }
        }
        let scheduler = Scheduler::builder(Config::default())
            .with_daemons(DaemonSet::empty())
            .build();
        let factory = TaskFactory::new("hostile", scheduler.sandbox(), |_| {
            Ok(Arc::new(Hostile) as TaskRef)
        });
        scheduler
            .set_bundle(Bundle::new(factory, local_definition("hostile")))
            .unwrap();
        let mut events = scheduler.bus().subscribe();

        scheduler.start().await.unwrap();
        settle(&scheduler).await;

        // The failing START hook was dropped; the run is still healthy and
        // the slot keeps draining.
        assert!(scheduler.is_valid());
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        scheduler
            .offer(Job::new(move || async move {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            }))
            .await;
        settle(&scheduler).await;
        assert!(ran.load(Ordering::SeqCst));

        let mut isolated = false;
        while let Ok(ev) = events.try_recv() {
            isolated |= ev.kind == EventKind::JobFailed;
        }
        assert!(isolated);
        scheduler.stop().await;
    }

    #[tokio::test]
    async fn telemetry_tracks_every_transition() {
        let sink = Arc::new(Recording::default());
        let scheduler = Scheduler::builder(Config::default())
            .with_track(sink.clone())
            .build();
        scheduler
            .set_bundle(primary_bundle(&scheduler, "miner"))
            .unwrap();

        scheduler.start().await.unwrap();
        settle(&scheduler).await;
        scheduler.suspend().await;
        scheduler.resume().await;
        scheduler.stop().await;

        let probe = sink.clone();
        wait_until(move || probe.pages().len() >= 4).await;
        let pages = sink.pages();
        assert_eq!(
            pages,
            vec![
                ("scripts/local/".to_string(), "miner".to_string()),
                ("scripts/local/pause".to_string(), "miner".to_string()),
                ("scripts/local/resume".to_string(), "miner".to_string()),
                ("scripts/local/stop".to_string(), "miner".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn telemetry_skipped_without_definition_name() {
        let sink = Arc::new(Recording::default());
        let scheduler = Scheduler::builder(Config::default())
            .with_track(sink.clone())
            .build();

        let factory = TaskFactory::new("anon", scheduler.sandbox(), |_| {
            Ok(Arc::new(Probe::new("anon")) as TaskRef)
        });
        let definition = Definition {
            id: Some("99".into()),
            name: None,
            is_local: false,
        };
        scheduler
            .set_bundle(Bundle::new(factory, definition))
            .unwrap();

        scheduler.start().await.unwrap();
        settle(&scheduler).await;
        scheduler.stop().await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(sink.pages().is_empty());
    }

    #[tokio::test]
    async fn bundle_is_immutable_after_set() {
        let scheduler = Scheduler::builder(Config::default()).build();
        scheduler
            .set_bundle(primary_bundle(&scheduler, "miner"))
            .unwrap();
        let err = scheduler
            .set_bundle(primary_bundle(&scheduler, "other"))
            .unwrap_err();
        assert!(matches!(err, RuntimeError::BundleAlreadySet));
    }

    #[tokio::test]
    async fn primary_instance_is_recorded_in_bundle() {
        let scheduler = Scheduler::builder(Config::default()).build();
        let bundle = primary_bundle(&scheduler, "miner");
        scheduler.set_bundle(bundle.clone()).unwrap();
        assert!(bundle.instance().is_none());

        scheduler.start().await.unwrap();
        settle(&scheduler).await;
        assert_eq!(bundle.instance().map(|t| t.name().to_string()), Some("miner".into()));
        scheduler.stop().await;
    }

    #[tokio::test]
    async fn redundant_transitions_are_noops() {
        let scheduler = Scheduler::builder(Config::default()).build();
        scheduler
            .set_bundle(primary_bundle(&scheduler, "miner"))
            .unwrap();

        // Nothing started yet: stop/suspend/resume all no-op.
        scheduler.stop().await;
        scheduler.suspend().await;
        scheduler.resume().await;
        assert_eq!(scheduler.state(), SchedulerState::NotStarted);
        assert!(!scheduler.is_suspended());

        scheduler.start().await.unwrap();
        scheduler.start().await.unwrap();
        scheduler.resume().await;
        assert_eq!(scheduler.state(), SchedulerState::Running);

        scheduler.suspend().await;
        scheduler.suspend().await;
        assert_eq!(scheduler.state(), SchedulerState::Suspended);

        scheduler.stop().await;
        scheduler.stop().await;
        assert_eq!(scheduler.state(), SchedulerState::NotStarted);
    }
}
