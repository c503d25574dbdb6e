//! Worker execution results.
//!
//! Every dispatch ends in a [`WorkerResult`] — either the value the worker
//! returned, or a failure-flavored result synthesized at the dispatch
//! boundary (error, timeout, panic). The scheduler publishes every result
//! to the event bus so downstream reactors can observe scheduler activity
//! without coupling to it.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::error::WorkerError;

/// Terminal classification of one dispatch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum WorkOutcome {
    /// The worker finished and returned a result.
    Completed,
    /// The worker returned an error or panicked; carries the reason.
    Failed(String),
    /// The dispatch exceeded its `run_timeout` and was cancelled.
    TimedOut,
}

/// Result of one worker execution.
///
/// `topic`/`content` carry the worker's own payload; `worker` names the
/// producer; `outcome` classifies how the dispatch ended.
#[derive(Clone, Debug, Serialize)]
pub struct WorkerResult {
    /// Topic the worker wants its payload associated with.
    pub topic: String,
    /// Arbitrary payload.
    pub content: Value,
    /// Name of the producing worker.
    pub worker: String,
    /// Terminal classification.
    pub outcome: WorkOutcome,
}

impl WorkerResult {
    /// Creates a successful result.
    pub fn ok(worker: impl Into<String>, topic: impl Into<String>, content: Value) -> Self {
        Self {
            topic: topic.into(),
            content,
            worker: worker.into(),
            outcome: WorkOutcome::Completed,
        }
    }

    /// Creates a failure-flavored result from a worker error.
    ///
    /// Used at the dispatch boundary so a crashing worker still produces a
    /// publishable result. The payload carries the error label and its
    /// retryability, so reactors on the result channel can decide whether
    /// re-triggering the worker makes sense.
    pub fn from_error(worker: impl Into<String>, err: &WorkerError) -> Self {
        let worker = worker.into();
        let outcome = match err {
            WorkerError::Timeout { .. } => WorkOutcome::TimedOut,
            other => WorkOutcome::Failed(other.to_string()),
        };
        Self {
            topic: String::new(),
            content: serde_json::json!({
                "error": err.as_label(),
                "retryable": err.is_retryable(),
            }),
            worker,
            outcome,
        }
    }

    /// Creates a timeout result for the given deadline.
    pub fn timed_out(worker: impl Into<String>, timeout: Duration) -> Self {
        Self::from_error(worker, &WorkerError::Timeout { timeout })
    }

    /// True unless the dispatch failed or timed out.
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, WorkOutcome::Completed)
    }
}
