//! # Bundle: definition and factory for the primary task of one run.
//!
//! A [`Bundle`] pairs the [`TaskFactory`] for the user's primary task with
//! its [`Definition`] (identity used by telemetry). It is set exactly once
//! before `start()` and read by `start()` and the telemetry path builder.
//!
//! [`Sandbox`] is the loading-context token: the scheduler refuses to boot a
//! primary factory built under a different sandbox than its own. It replaces
//! an ambient class-loader check with an explicit capability value.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::core::Context;
use crate::error::RuntimeError;
use crate::tasks::TaskRef;

/// Identifier reported for locally developed primary tasks.
pub const LOCAL_ID: &str = "local";

/// Opaque token identifying the context a factory was built under.
///
/// Tokens are process-unique; two calls to [`Sandbox::new`] never compare
/// equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sandbox(u64);

impl Sandbox {
    /// Allocates a fresh, process-unique sandbox token.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Constructor for a [`Task`](crate::Task), registered by kind identifier.
///
/// Factories replace reflective instantiation: a run names the capability it
/// wants and the factory produces the concrete task against the run
/// [`Context`].
#[derive(Clone)]
pub struct TaskFactory {
    kind: Arc<str>,
    sandbox: Sandbox,
    make: Arc<dyn Fn(&Context) -> Result<TaskRef, RuntimeError> + Send + Sync>,
}

impl TaskFactory {
    /// Creates a factory for the given task kind under the given sandbox.
    pub fn new<F>(kind: impl Into<Arc<str>>, sandbox: Sandbox, make: F) -> Self
    where
        F: Fn(&Context) -> Result<TaskRef, RuntimeError> + Send + Sync + 'static,
    {
        Self {
            kind: kind.into(),
            sandbox,
            make: Arc::new(make),
        }
    }

    /// Returns the task-kind identifier.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the sandbox token this factory was built under.
    pub fn sandbox(&self) -> Sandbox {
        self.sandbox
    }

    /// Instantiates the task against the run context.
    pub fn make(&self, ctx: &Context) -> Result<TaskRef, RuntimeError> {
        (self.make)(ctx)
    }
}

impl std::fmt::Debug for TaskFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskFactory")
            .field("kind", &self.kind)
            .field("sandbox", &self.sandbox)
            .finish_non_exhaustive()
    }
}

/// Identity of the primary task, used by telemetry.
#[derive(Debug, Clone, Default)]
pub struct Definition {
    /// Registry identifier; required for tracking unless `is_local`.
    pub id: Option<String>,
    /// Display name; required for tracking.
    pub name: Option<String>,
    /// Whether the task is locally developed (tracked under `"local"`).
    pub is_local: bool,
}

impl Definition {
    /// Returns the telemetry id segment, or `None` when tracking must be
    /// skipped (no name, or a remote task without a usable id).
    pub(crate) fn track_id(&self) -> Option<&str> {
        self.name.as_ref()?;
        if self.is_local {
            return Some(LOCAL_ID);
        }
        match self.id.as_deref() {
            Some(id) if !id.is_empty() => Some(id),
            _ => None,
        }
    }
}

/// Definition and factory for the primary task of one run.
///
/// Immutable after [`Scheduler::set_bundle`](crate::Scheduler::set_bundle);
/// the instantiated primary task is recorded here once bootstrap succeeds so
/// embedders can reach the live instance.
#[derive(Clone)]
pub struct Bundle {
    factory: TaskFactory,
    definition: Definition,
    instance: Arc<Mutex<Option<TaskRef>>>,
}

impl Bundle {
    /// Creates a bundle from the primary factory and its definition.
    pub fn new(factory: TaskFactory, definition: Definition) -> Self {
        Self {
            factory,
            definition,
            instance: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the primary task factory.
    pub fn factory(&self) -> &TaskFactory {
        &self.factory
    }

    /// Returns the primary task definition.
    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    /// Returns the instantiated primary task, if bootstrap has run.
    pub fn instance(&self) -> Option<TaskRef> {
        self.instance.lock().ok().and_then(|slot| slot.clone())
    }

    pub(crate) fn set_instance(&self, task: TaskRef) {
        if let Ok(mut slot) = self.instance.lock() {
            *slot = Some(task);
        }
    }

    pub(crate) fn clear_instance(&self) {
        if let Ok(mut slot) = self.instance.lock() {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sandbox_tokens_are_unique() {
        assert_ne!(Sandbox::new(), Sandbox::new());
    }

    #[test]
    fn track_id_requires_name() {
        let def = Definition {
            id: Some("42".into()),
            name: None,
            is_local: false,
        };
        assert_eq!(def.track_id(), None);
    }

    #[test]
    fn track_id_requires_id_for_remote_tasks() {
        let def = Definition {
            id: None,
            name: Some("miner".into()),
            is_local: false,
        };
        assert_eq!(def.track_id(), None);

        let def = Definition {
            id: Some(String::new()),
            name: Some("miner".into()),
            is_local: false,
        };
        assert_eq!(def.track_id(), None);

        let def = Definition {
            id: Some("42".into()),
            name: Some("miner".into()),
            is_local: false,
        };
        assert_eq!(def.track_id(), Some("42"));
    }

    #[test]
    fn local_tasks_track_under_local_id() {
        let def = Definition {
            id: None,
            name: Some("miner".into()),
            is_local: true,
        };
        assert_eq!(def.track_id(), Some(LOCAL_ID));
    }
}
