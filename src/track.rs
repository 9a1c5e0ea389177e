//! # Telemetry sink.
//!
//! Lifecycle transitions emit a best-effort page view keyed by the broadcast
//! signal: `scripts/{id|"local"}/{action}` where the action segment is empty
//! for START and `pause`/`resume`/`stop` otherwise. Delivery is
//! fire-and-forget; a slow or failing sink never affects scheduling.

use async_trait::async_trait;

/// Best-effort telemetry sink.
///
/// Implementations should swallow their own errors; the scheduler neither
/// awaits nor observes the outcome.
#[async_trait]
pub trait Track: Send + Sync + 'static {
    /// Records one page view.
    async fn track(&self, path: &str, label: &str);
}

/// Telemetry sink that discards everything.
#[derive(Debug, Default)]
pub struct NoopTrack;

#[async_trait]
impl Track for NoopTrack {
    async fn track(&self, _path: &str, _label: &str) {}
}
