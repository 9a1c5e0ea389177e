//! Error types used by the scheduler runtime and task hooks.
//!
//! This module defines two main error enums:
//!
//! - [`RuntimeError`] — errors raised by the orchestration runtime itself
//!   (bundle/sandbox validation, bootstrap).
//! - [`TaskError`] — errors raised by individual job executions.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for
//! logging/metrics.

use thiserror::Error;

/// # Errors produced by the scheduler runtime.
///
/// These represent failures in the orchestration system itself, such as
/// starting a run without a bundle or a factory built under the wrong
/// sandbox.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// `start()` was called before a bundle was set. No state is mutated;
    /// the caller may retry after `set_bundle`.
    #[error("bundle not set")]
    BundleMissing,

    /// `set_bundle()` was called twice. The bundle is immutable after set.
    #[error("bundle already set")]
    BundleAlreadySet,

    /// The primary factory's sandbox token does not match the scheduler's.
    #[error("sandbox mismatch: factory was built outside the run sandbox")]
    SandboxMismatch,

    /// A daemon or the primary task failed to instantiate. Fatal to the
    /// whole run; never retried, never isolated to a single task.
    #[error("failed to instantiate '{task}': {reason}")]
    Instantiation {
        /// Kind identifier of the task that failed to construct.
        task: String,
        /// The underlying failure message.
        reason: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use scriptvisor::RuntimeError;
    ///
    /// assert_eq!(RuntimeError::BundleMissing.as_label(), "runtime_bundle_missing");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::BundleMissing => "runtime_bundle_missing",
            RuntimeError::BundleAlreadySet => "runtime_bundle_already_set",
            RuntimeError::SandboxMismatch => "runtime_sandbox_mismatch",
            RuntimeError::Instantiation { .. } => "runtime_instantiation",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::BundleMissing => "bundle not set".to_string(),
            RuntimeError::BundleAlreadySet => "bundle already set".to_string(),
            RuntimeError::SandboxMismatch => "sandbox mismatch".to_string(),
            RuntimeError::Instantiation { task, reason } => {
                format!("instantiation of '{task}' failed: {reason}")
            }
        }
    }
}

/// # Errors produced by job execution.
///
/// A failing job is logged and dropped; the drain loop continues. A panic
/// inside a job is caught separately by the worker.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Job execution failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Job observed the run shutting down and bailed out early.
    #[error("run cancelled")]
    Canceled,
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Canceled => "run cancelled".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(
            RuntimeError::SandboxMismatch.as_label(),
            "runtime_sandbox_mismatch"
        );
        assert_eq!(
            RuntimeError::Instantiation {
                task: "guard".into(),
                reason: "boom".into()
            }
            .as_label(),
            "runtime_instantiation"
        );
        assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
    }

    #[test]
    fn messages_carry_detail() {
        let err = RuntimeError::Instantiation {
            task: "session-guard".into(),
            reason: "no credentials".into(),
        };
        assert!(err.as_message().contains("session-guard"));
        assert!(err.as_message().contains("no credentials"));

        let err = TaskError::Fail {
            error: "boom".into(),
        };
        assert!(err.as_message().contains("boom"));
    }
}
