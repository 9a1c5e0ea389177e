//! # scriptvisor
//!
//! **Scriptvisor** coordinates one user-supplied automation task alongside a
//! fixed set of always-on guard tasks ("daemons"), funneled through a single
//! serialized execution slot so side-effecting operations never race.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!            ┌────────────┐      set once, before start()
//!            │   Bundle   │  (primary TaskFactory + Definition)
//!            └─────┬──────┘
//!                  ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Scheduler (state machine)                                    │
//! │  - flags: started / suspended / stopping (CAS transitions)    │
//! │  - active-task set (daemons first, primary last)              │
//! │  - lifecycle broadcast: hooks_for(signal) → jobs              │
//! │  - Watchdog (optional, timeout + 1s grace)                    │
//! └───────┬─────────────────────────────────────────────┬─────────┘
//!         │ bootstrap / hook / control jobs              │ events
//!         ▼                                              ▼
//! ┌──────────────────────────┐                  ┌─────────────────┐
//! │  priority queue          │                  │  Bus            │
//! │  (desc priority,         │                  │  (broadcast)    │
//! │   stable FIFO tie-break) │                  └─────────────────┘
//! └───────┬──────────────────┘
//!         ▼
//!   single worker slot  ──►  at most one job active, ever
//! ```
//!
//! ### Lifecycle
//! ```text
//! start():  validate bundle + sandbox ──► CAS started
//!           ├─► engage input gate
//!           ├─► fresh queue + single worker
//!           ├─► arm watchdog (if timeout configured)
//!           └─► enqueue: daemon bootstraps… → primary bootstrap → START
//!
//! suspend(): CAS suspended ──► broadcast SUSPEND ──► release gate
//!            └─► idle job occupies the slot (600ms poll) until cleared
//!
//! resume():  CAS ¬suspended ──► broadcast RESUME ──► engage gate
//!
//! stop():    CAS stopping ──► cancel watchdog ──► broadcast STOP
//!            ├─► detach every task from the dispatcher
//!            ├─► graceful executor shutdown (drain, reject new)
//!            ├─► release gate
//!            └─► reset flags → NotStarted (restartable)
//! ```
//!
//! ## Features
//! | Area            | Description                                          | Key types / traits                  |
//! |-----------------|------------------------------------------------------|-------------------------------------|
//! | **Tasks**       | Automation units with per-signal lifecycle hooks.    | [`Task`], [`Signal`], [`Job`]       |
//! | **Runs**        | One primary task per run, described up front.        | [`Bundle`], [`Definition`]          |
//! | **Daemons**     | Built-in guard set booted before the primary.        | [`DaemonSet`]                       |
//! | **Control**     | Concurrent-safe start/stop/suspend/resume.           | [`Scheduler`], [`SchedulerState`]   |
//! | **Host seams**  | Input gate, event dispatcher, telemetry sink.        | [`Gate`], [`Dispatch`], [`Track`]   |
//! | **Errors**      | Typed errors for runtime and job failures.           | [`RuntimeError`], [`TaskError`]     |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use scriptvisor::{
//!     Bundle, Config, Definition, Job, Scheduler, Signal, Task, TaskFactory, TaskRef,
//! };
//!
//! struct Greeter;
//!
//! impl Task for Greeter {
//!     fn name(&self) -> &str {
//!         "greeter"
//!     }
//!
//!     fn priority(&self) -> i32 {
//!         0
//!     }
//!
//!     fn set_priority(&self, _priority: i32) {}
//!
//!     fn hooks_for(&self, signal: Signal) -> Vec<Job> {
//!         match signal {
//!             Signal::Start => vec![Job::new(|| async {
//!                 println!("hello from the worker slot");
//!                 Ok(())
//!             })],
//!             _ => Vec::new(),
//!         }
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scheduler = Scheduler::builder(Config::default()).build();
//!
//!     let factory = TaskFactory::new("greeter", scheduler.sandbox(), |_ctx| {
//!         Ok(Arc::new(Greeter) as TaskRef)
//!     });
//!     let definition = Definition {
//!         id: None,
//!         name: Some("greeter".into()),
//!         is_local: true,
//!     };
//!     scheduler.set_bundle(Bundle::new(factory, definition))?;
//!
//!     scheduler.start().await?;
//!     scheduler.stop().await;
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod daemons;
mod dispatch;
mod error;
mod events;
mod exec;
mod gate;
mod tasks;
mod track;

// ---- Public re-exports ----

pub use config::{local_from_props, Config, LOCAL_PROPERTY, TIMEOUT_PROPERTY};
pub use crate::core::{Context, Scheduler, SchedulerBuilder, SchedulerState};
pub use daemons::{
    DaemonFactory, DaemonSet, DialogCloser, Humanizer, PinGuard, SessionGuard, TicketSweeper,
};
pub use dispatch::{Dispatch, NullDispatch};
pub use error::{RuntimeError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use gate::{Gate, InputGate};
pub use tasks::{
    Bundle, Definition, Job, JobFuture, Sandbox, Signal, Task, TaskFactory, TaskRef, LOCAL_ID,
};
pub use track::{NoopTrack, Track};

// Optional: expose a simple built-in logger listener (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use events::LogWriter;
