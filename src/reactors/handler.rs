//! Reactor handler trait and function-backed implementation.
//!
//! A [`Handler`] processes one [`ReactorRequest`] per attempt. [`HandlerFn`]
//! wraps a closure producing a fresh future per attempt, mirroring the
//! worker-side `WorkerFn`.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ReactorError;

/// Immutable request value handed to a reactor handler.
#[derive(Clone, Debug)]
pub struct ReactorRequest {
    /// Topic of the event being handled.
    pub topic: String,
    /// Event payload.
    pub content: Value,
    /// Name of the executing reactor.
    pub reactor: String,
}

impl ReactorRequest {
    /// Builds a request for one reactor execution.
    pub fn new(
        topic: impl Into<String>,
        content: Value,
        reactor: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            content,
            reactor: reactor.into(),
        }
    }
}

/// Async event handler bound into an
/// [`EventReactor`](crate::reactors::EventReactor).
///
/// Called once per attempt; errors are subject to the reactor's
/// [`RetryPolicy`](crate::reactors::RetryPolicy).
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Processes one request.
    async fn handle(&self, req: &ReactorRequest) -> Result<(), ReactorError>;
}

/// Function-backed handler implementation.
pub struct HandlerFn<F> {
    f: F,
}

impl<F> HandlerFn<F> {
    /// Creates a new function-backed handler.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the handler and returns it as a shared trait object.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(ReactorRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ReactorError>> + Send + 'static,
{
    async fn handle(&self, req: &ReactorRequest) -> Result<(), ReactorError> {
        (self.f)(req.clone()).await
    }
}
