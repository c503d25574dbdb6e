//! Error types used by the workbus runtime, workers, and reactors.
//!
//! This module defines the error enums for each failure boundary:
//!
//! - [`RuntimeError`] — errors raised by the scheduler runtime itself.
//! - [`WorkerError`] — errors raised by individual worker executions.
//! - [`ReactorError`] — errors raised inside reactor handlers.
//! - [`PublishError`] — errors raised at the publish surface.
//! - [`RegistryError`] — errors raised during worker registration.
//!
//! The enums provide `as_label()` helpers producing short stable snake_case
//! labels for logs, plus utilities such as [`WorkerError::is_retryable`].

use std::time::Duration;
use thiserror::Error;

/// Errors produced by the workbus runtime.
///
/// These represent failures in the scheduling machinery itself, such as a
/// shutdown sequence exceeding its grace period.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some workers remained in flight
    /// and had to be aborted.
    #[error("shutdown grace {grace:?} exceeded; stuck: {stuck:?}; aborting")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of workers that did not finish in time.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }
}

/// Errors produced by worker execution.
///
/// Some errors are retryable from the scheduler's point of view
/// (`Fail`, `Timeout`); `Fatal` and `Canceled` are not.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker execution exceeded its `run_timeout`.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// Non-recoverable fatal error.
    #[error("fatal error: {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// Worker execution failed but may succeed on a later tick.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Worker was cancelled by the runtime token.
    #[error("cancelled")]
    Canceled,
}

impl WorkerError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::Timeout { .. } => "worker_timeout",
            WorkerError::Fatal { .. } => "worker_fatal",
            WorkerError::Fail { .. } => "worker_failed",
            WorkerError::Canceled => "worker_canceled",
        }
    }

    /// Wraps an arbitrary error message into a retryable failure.
    pub fn fail(error: impl Into<String>) -> Self {
        WorkerError::Fail {
            error: error.into(),
        }
    }

    /// True for error flavors that are safe to re-dispatch on a later tick.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WorkerError::Fail { .. } | WorkerError::Timeout { .. })
    }
}

/// Errors produced inside reactor handlers.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ReactorError {
    /// Handler returned an error for this attempt.
    #[error("handler failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Reactor execution exceeded the reactor's timeout.
    #[error("reactor timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// Handler panicked; the panic was caught at the execute boundary.
    #[error("handler panicked: {info}")]
    Panicked {
        /// Formatted panic payload.
        info: String,
    },
}

impl ReactorError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ReactorError::Fail { .. } => "reactor_failed",
            ReactorError::Timeout { .. } => "reactor_timeout",
            ReactorError::Panicked { .. } => "reactor_panicked",
        }
    }

    /// Wraps an arbitrary error message into a retryable handler failure.
    pub fn fail(error: impl Into<String>) -> Self {
        ReactorError::Fail {
            error: error.into(),
        }
    }
}

/// Errors produced at the publish surface of the event bus.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PublishError {
    /// The named channel was never registered. Publishing to an unknown
    /// channel is a configuration error and fails fast.
    #[error("channel not found: {channel}")]
    ChannelNotFound {
        /// The channel name that failed to resolve.
        channel: String,
    },

    /// The channel exists but is not public; raw events cannot be pushed
    /// onto its queue from outside. Use direct triggering instead.
    #[error("channel is private: {channel}")]
    ChannelPrivate {
        /// The private channel's name.
        channel: String,
    },

    /// A direct trigger found no reactor bound to the topic.
    #[error("no reactor bound for topic {topic} on channel {channel}")]
    NoReactor {
        /// The channel that was queried.
        channel: String,
        /// The topic that had no binding.
        topic: String,
    },
}

impl PublishError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            PublishError::ChannelNotFound { .. } => "publish_channel_not_found",
            PublishError::ChannelPrivate { .. } => "publish_channel_private",
            PublishError::NoReactor { .. } => "publish_no_reactor",
        }
    }
}

/// Errors produced during worker registration.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RegistryError {
    /// A worker with this name already exists and the registry is in
    /// strict mode.
    #[error("worker already registered: {name}")]
    DuplicateWorker {
        /// The conflicting worker name.
        name: String,
    },
}

impl RegistryError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RegistryError::DuplicateWorker { .. } => "registry_duplicate_worker",
        }
    }
}
