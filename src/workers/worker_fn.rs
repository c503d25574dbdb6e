//! Function-backed worker (`WorkerFn`).
//!
//! [`WorkerFn`] wraps a closure `F: Fn(CancellationToken) -> Fut`, producing
//! a fresh future per dispatch. This avoids shared mutable state between
//! executions; if shared state is needed, move an `Arc<...>` into the
//! closure explicitly.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use workbus::{WorkerFn, WorkerRef, WorkerResult, WorkerError};
//!
//! let w: WorkerRef = WorkerFn::arc("heartbeat", |ctx: CancellationToken| async move {
//!     if ctx.is_cancelled() {
//!         return Err(WorkerError::Canceled);
//!     }
//!     Ok(WorkerResult::ok("heartbeat", "heartbeat.tick", serde_json::json!({})))
//! });
//!
//! assert_eq!(w.name(), "heartbeat");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::WorkerError;
use crate::workers::{Worker, WorkerResult};

/// Function-backed worker implementation.
///
/// Wraps a closure that *creates* a new future per dispatch.
#[derive(Debug)]
pub struct WorkerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> WorkerFn<F> {
    /// Creates a new function-backed worker.
    ///
    /// Prefer [`WorkerFn::arc`] when you immediately need a [`WorkerRef`](crate::WorkerRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the worker and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Worker for WorkerFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<WorkerResult, WorkerError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, ctx: CancellationToken) -> Result<WorkerResult, WorkerError> {
        (self.f)(ctx).await
    }
}
