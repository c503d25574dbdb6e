//! Worker abstraction.
//!
//! A [`Worker`] is an async, cancelable unit of work driven by the
//! scheduler. It receives a [`CancellationToken`] per dispatch and should
//! periodically check it to stop cooperatively during shutdown or when a
//! `run_timeout` fires.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::WorkerError;
use crate::workers::WorkerResult;

/// Shared handle to a worker (`Arc<dyn Worker>`).
pub type WorkerRef = Arc<dyn Worker>;

/// Asynchronous, cancelable unit of work.
///
/// A `Worker` has a stable [`name`](Worker::name) and an async
/// [`execute`](Worker::execute) method invoked once per scheduling tick
/// while its descriptor marks it as looping, or exactly once otherwise.
/// Implementations should regularly check cancellation and exit promptly.
///
/// Lifecycle hooks: [`on_create`](Worker::on_create) runs before the first
/// dispatch, [`on_destroy`](Worker::on_destroy) when the worker leaves the
/// loop set or the runtime shuts down.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use workbus::{Worker, WorkerError, WorkerResult};
///
/// struct Probe;
///
/// #[async_trait]
/// impl Worker for Probe {
///     fn name(&self) -> &str { "probe" }
///
///     async fn execute(&self, ctx: CancellationToken) -> Result<WorkerResult, WorkerError> {
///         if ctx.is_cancelled() {
///             return Err(WorkerError::Canceled);
///         }
///         Ok(WorkerResult::ok("probe", "probe.done", serde_json::json!({"ok": true})))
///     }
/// }
/// ```
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    /// Returns a stable, human-readable worker name.
    fn name(&self) -> &str;

    /// Called once before the worker's first dispatch.
    async fn on_create(&self) {}

    /// Executes one unit of work until completion or cancellation.
    ///
    /// Implementations should check `ctx.is_cancelled()` and exit quickly
    /// to honor graceful shutdown and enforced timeouts.
    async fn execute(&self, ctx: CancellationToken) -> Result<WorkerResult, WorkerError>;

    /// Called when the worker is removed from the schedule or on shutdown.
    ///
    /// `last` is the worker's final result, when one exists.
    async fn on_destroy(&self, last: Option<&WorkerResult>) {
        let _ = last;
    }
}
