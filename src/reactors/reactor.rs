//! The event reactor: a bound handler for one (channel, topic) pair.
//!
//! An [`EventReactor`] owns its retry, timeout, and terminal-callback
//! semantics. `execute()` guarantees:
//!
//! - each failed attempt fires `on_error`,
//! - the first success fires `on_success` and stops retrying,
//! - `on_done` fires exactly once, whatever the outcome,
//! - a panicking handler counts as a failed attempt and never escapes.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde_json::Value;
use tokio::time;
use tracing::warn;

use crate::error::ReactorError;
use crate::reactors::{Handler, ReactorRequest, RetryPolicy};

type SuccessFn = dyn Fn(&ReactorRequest) + Send + Sync;
type ErrorFn = dyn Fn(&ReactorRequest, &ReactorError) + Send + Sync;
type DoneFn = dyn Fn(&ReactorRequest) + Send + Sync;

/// A registered handler bound to a channel + topic, with its own retry,
/// timeout, and callback policy.
///
/// Cheap to clone; all state behind `Arc`s. The internal attempt counter
/// lives on the stack of each `execute()` call, so concurrent executions
/// of the same reactor never interfere.
#[derive(Clone)]
pub struct EventReactor {
    name: Arc<str>,
    priority: i32,
    handler: Arc<dyn Handler>,
    retry: RetryPolicy,
    timeout: Option<Duration>,
    on_success: Option<Arc<SuccessFn>>,
    on_error: Option<Arc<ErrorFn>>,
    on_done: Option<Arc<DoneFn>>,
}

impl EventReactor {
    /// Starts building a reactor with the given name.
    pub fn builder(name: impl Into<String>) -> ReactorBuilder {
        ReactorBuilder::new(name)
    }

    /// The reactor's registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Priority used by
    /// [`ResponseMechanism::PriorityOrder`](crate::events::ResponseMechanism::PriorityOrder)
    /// resolution.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Executes the reactor for one event.
    ///
    /// Runs the attempt loop under the reactor's timeout when one is set.
    /// Returns the terminal outcome; all callback invocations happen
    /// inside.
    pub async fn execute(&self, topic: &str, content: &Value) -> Result<(), ReactorError> {
        let req = ReactorRequest::new(topic, content.clone(), self.name.to_string());

        let outcome = match self.timeout {
            Some(d) if d > Duration::ZERO => match time::timeout(d, self.attempt_loop(&req)).await
            {
                Ok(res) => res,
                Err(_elapsed) => {
                    let err = ReactorError::Timeout { timeout: d };
                    self.fire_error(&req, &err);
                    Err(err)
                }
            },
            _ => self.attempt_loop(&req).await,
        };

        match &outcome {
            Ok(()) => {
                if let Some(cb) = &self.on_success {
                    cb(&req);
                }
            }
            Err(err) => {
                warn!(
                    reactor = %self.name,
                    topic = %req.topic,
                    error = err.as_label(),
                    "reactor execution failed"
                );
            }
        }

        if let Some(cb) = &self.on_done {
            cb(&req);
        }
        outcome
    }

    /// Runs attempts per the retry policy until success or exhaustion.
    async fn attempt_loop(&self, req: &ReactorRequest) -> Result<(), ReactorError> {
        let mut remaining = self.retry.max_attempts();
        loop {
            match self.attempt(req).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    self.fire_error(req, &err);
                    match &mut remaining {
                        None => continue,
                        Some(n) => {
                            *n -= 1;
                            if *n == 0 {
                                return Err(err);
                            }
                        }
                    }
                }
            }
        }
    }

    /// One handler attempt; panics are caught and mapped to errors.
    async fn attempt(&self, req: &ReactorRequest) -> Result<(), ReactorError> {
        let fut = self.handler.handle(req);
        match std::panic::AssertUnwindSafe(fut).catch_unwind().await {
            Ok(res) => res,
            Err(panic) => {
                let info = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic payload".to_string());
                Err(ReactorError::Panicked { info })
            }
        }
    }

    fn fire_error(&self, req: &ReactorRequest, err: &ReactorError) {
        if let Some(cb) = &self.on_error {
            cb(req, err);
        }
    }
}

impl fmt::Debug for EventReactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventReactor")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("retry", &self.retry)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Fluent builder for [`EventReactor`].
pub struct ReactorBuilder {
    name: String,
    priority: i32,
    retry: RetryPolicy,
    timeout: Option<Duration>,
    on_success: Option<Arc<SuccessFn>>,
    on_error: Option<Arc<ErrorFn>>,
    on_done: Option<Arc<DoneFn>>,
}

impl ReactorBuilder {
    /// Creates a builder with default policy (`Once`, no timeout,
    /// priority 0).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: 0,
            retry: RetryPolicy::default(),
            timeout: None,
            on_success: None,
            on_error: None,
            on_done: None,
        }
    }

    /// Sets the resolution priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the per-execute timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Callback fired once on the first successful attempt.
    pub fn on_success(mut self, cb: impl Fn(&ReactorRequest) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(cb));
        self
    }

    /// Callback fired for every failed attempt.
    pub fn on_error(
        mut self,
        cb: impl Fn(&ReactorRequest, &ReactorError) + Send + Sync + 'static,
    ) -> Self {
        self.on_error = Some(Arc::new(cb));
        self
    }

    /// Callback fired exactly once per execute, whatever the outcome.
    pub fn on_done(mut self, cb: impl Fn(&ReactorRequest) + Send + Sync + 'static) -> Self {
        self.on_done = Some(Arc::new(cb));
        self
    }

    /// Builds the reactor around an existing handler.
    pub fn build_with_handler(self, handler: Arc<dyn Handler>) -> EventReactor {
        if matches!(self.retry, RetryPolicy::Forever) && self.timeout.is_none() {
            warn!(
                reactor = %self.name,
                "RetryPolicy::Forever without a timeout can spin indefinitely"
            );
        }
        EventReactor {
            name: self.name.into(),
            priority: self.priority,
            handler,
            retry: self.retry,
            timeout: self.timeout,
            on_success: self.on_success,
            on_error: self.on_error,
            on_done: self.on_done,
        }
    }

    /// Builds the reactor from a handler closure.
    pub fn build<F, Fut>(self, f: F) -> EventReactor
    where
        F: Fn(ReactorRequest) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), ReactorError>> + Send + 'static,
    {
        let handler = crate::reactors::HandlerFn::arc(f);
        self.build_with_handler(handler)
    }
}
