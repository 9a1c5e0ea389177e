//! # Simple logging listener for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format. This is
//! primarily useful for development, debugging, and demos.
//!
//! ## Output format
//! ```text
//! [started]
//! [attached] task=session-guard
//! [signal] suspend
//! [job-failed] err="hook exploded"
//! [watchdog-expired]
//! [stopped]
//! ```

use tokio::task::JoinHandle;

use super::{Bus, Event, EventKind};

/// Simple stdout logging listener.
///
/// Enabled via the `logging` feature. Not intended for production use —
/// subscribe to the [`Bus`] directly for structured logging or metrics.
pub struct LogWriter;

impl LogWriter {
    /// Subscribes to the bus and prints every event until the bus closes.
    pub fn spawn(bus: &Bus) -> JoinHandle<()> {
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            while let Ok(ev) = rx.recv().await {
                Self::write(&ev);
            }
        })
    }

    fn write(e: &Event) {
        match e.kind {
            EventKind::RunStarted => println!("[started]"),
            EventKind::RunSuspended => println!("[suspended]"),
            EventKind::RunResumed => println!("[resumed]"),
            EventKind::RunStopped => println!("[stopped]"),
            EventKind::SignalBroadcast => {
                if let Some(signal) = e.signal {
                    println!("[signal] {signal:?}");
                }
            }
            EventKind::TaskAttached => {
                println!("[attached] task={:?}", e.task);
            }
            EventKind::TaskDetached => {
                println!("[detached] task={:?}", e.task);
            }
            EventKind::BootstrapFailed => {
                println!("[bootstrap-failed] task={:?} err={:?}", e.task, e.reason);
            }
            EventKind::JobFailed => {
                println!("[job-failed] err={:?}", e.reason);
            }
            EventKind::WatchdogExpired => println!("[watchdog-expired]"),
        }
    }
}
