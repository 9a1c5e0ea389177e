//! # Job: the minimal schedulable unit of work.
//!
//! A [`Job`] wraps a closure `F: FnOnce() -> Future`, producing its future
//! only when the worker picks it up. Jobs are transient: created, queued, run
//! once, discarded.
//!
//! ## Priority
//! A job carries an inherited priority — the owning task's priority for hook
//! jobs, or neutral `0` for control jobs. The queue orders by priority
//! descending with a stable FIFO tie-break.

use std::future::Future;
use std::pin::Pin;

use crate::error::TaskError;

/// Boxed future produced by a job when the worker runs it.
pub type JobFuture = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send>>;

/// A zero-argument unit of schedulable work.
pub struct Job {
    priority: i32,
    run: Box<dyn FnOnce() -> JobFuture + Send>,
}

impl Job {
    /// Creates a control job at neutral priority `0`.
    ///
    /// ## Example
    /// ```
    /// use scriptvisor::Job;
    ///
    /// let job = Job::new(|| async { Ok(()) });
    /// assert_eq!(job.priority(), 0);
    /// ```
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Self::with_priority(0, f)
    }

    /// Creates a job with an explicit priority.
    pub fn with_priority<F, Fut>(priority: i32, f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Self {
            priority,
            run: Box::new(move || -> JobFuture { Box::pin(f()) }),
        }
    }

    /// Returns the job's priority.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Re-stamps the priority; used at broadcast time so hook jobs inherit
    /// the owning task's current priority.
    pub(crate) fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    /// Consumes the job and produces its future.
    pub(crate) fn into_future(self) -> JobFuture {
        (self.run)()
    }
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}
