//! Worker scheduling descriptor.
//!
//! [`WorkerProps`] bundles everything the scheduler needs to know about a
//! worker besides its execution body: whether it re-runs every tick, the
//! delay after each execution, and the per-dispatch timeout.
//!
//! Created at registration time and immutable afterwards. A descriptor can
//! be built explicitly or inherit defaults from the global [`Config`].

use std::time::Duration;

use crate::config::Config;

/// Immutable scheduling descriptor for one worker.
///
/// ## Field semantics
/// - `is_loop`: re-dispatch every tick (`true`) or run exactly once
/// - `delay_time`: cancellable sleep after each execution, before the
///   worker becomes idle again (`None` = none)
/// - `run_timeout`: enforced per-dispatch deadline; on expiry the dispatch
///   token is cancelled and a timeout result is reported (`None` = none)
#[derive(Clone, Debug)]
pub struct WorkerProps {
    name: String,
    is_loop: bool,
    delay_time: Option<Duration>,
    run_timeout: Option<Duration>,
}

impl WorkerProps {
    /// Creates a one-shot descriptor with no delay and no timeout.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_loop: false,
            delay_time: None,
            run_timeout: None,
        }
    }

    /// Creates a descriptor inheriting `delay_time`/`run_timeout` defaults
    /// from the global config (`0s` sentinels are treated as `None`).
    pub fn with_defaults(name: impl Into<String>, cfg: &Config) -> Self {
        Self {
            name: name.into(),
            is_loop: false,
            delay_time: cfg.default_delay(),
            run_timeout: cfg.default_run_timeout(),
        }
    }

    /// Marks the worker as looping: it re-enters the active list after
    /// every completed dispatch.
    pub fn looped(mut self) -> Self {
        self.is_loop = true;
        self
    }

    /// Sets the post-execution delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay_time = Some(delay);
        self
    }

    /// Sets the enforced per-dispatch timeout.
    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = Some(timeout);
        self
    }

    /// The worker's registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if the worker re-runs every tick.
    pub fn is_loop(&self) -> bool {
        self.is_loop
    }

    /// Post-execution delay, if any.
    pub fn delay_time(&self) -> Option<Duration> {
        self.delay_time
    }

    /// Enforced per-dispatch timeout, if any.
    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout
    }

    /// Returns a copy of this descriptor under a different name.
    ///
    /// Used by the registry's permissive mode when auto-suffixing a
    /// duplicate registration.
    pub(crate) fn renamed(&self, name: String) -> Self {
        Self {
            name,
            is_loop: self.is_loop,
            delay_time: self.delay_time,
            run_timeout: self.run_timeout,
        }
    }
}
