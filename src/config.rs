//! Global runtime configuration.
//!
//! [`Config`] centralizes the settings shared by the scheduler and the
//! event bus. It is used in two ways:
//!
//! 1. **Waiter creation**: `Waiter::new(config, registry, bus)`
//! 2. **Worker defaults**: `WorkerProps::with_defaults(name, &config)`
//!
//! ## Sentinel values
//! - `pool_size = 0` → unlimited (no semaphore created)
//! - `run_timeout = 0s` → no timeout (treated as `None` by the accessors)

use std::time::Duration;

use crate::events::PriorityWeights;
use crate::waiter::WaiterPolicy;
use crate::workers::RegisterMode;

/// Global configuration for the workbus runtime.
///
/// ## Field semantics
/// - `tick`: scheduler loop interval; every tick dispatches idle workers
/// - `pool_size`: concurrency bound (`0` = unlimited; ignored by `Stable`)
/// - `policy`: dispatch discipline ([`WaiterPolicy`])
/// - `grace`: maximum wait for in-flight workers during shutdown
/// - `join_timeout`: bound on the event worker's per-tick reactor join
/// - `register_mode`: duplicate-name handling in the worker registry
/// - `result_channel` / `result_topic`: where worker results are published
/// - `delay_time` / `run_timeout`: per-worker defaults (`0s` = none)
/// - `weights`: anti-starvation priority weights for event queues
#[derive(Clone, Debug)]
pub struct Config {
    /// Scheduler tick interval.
    pub tick: Duration,

    /// Maximum number of workers dispatched concurrently.
    ///
    /// - `0` = unlimited (no semaphore)
    /// - `n > 0` = at most `n` in-flight dispatches (`Simple` grows this
    ///   to the active worker count; `Safe` treats it as a hard bound)
    pub pool_size: usize,

    /// Dispatch discipline for the scheduler.
    pub policy: WaiterPolicy,

    /// Maximum time to wait for in-flight workers on shutdown before
    /// aborting them.
    pub grace: Duration,

    /// Bound on joining the reactor executions spawned within one tick of
    /// the event worker.
    pub join_timeout: Duration,

    /// Duplicate-name handling for worker registration.
    pub register_mode: RegisterMode,

    /// Channel that receives scheduler activity events.
    pub result_channel: String,

    /// Topic under which worker results are published.
    pub result_topic: String,

    /// Default delay a worker sleeps after each execution (`0s` = none).
    pub delay_time: Duration,

    /// Default per-dispatch timeout (`0s` = no timeout).
    pub run_timeout: Duration,

    /// Anti-starvation weights applied by event queues.
    pub weights: PriorityWeights,
}

impl Config {
    /// Returns the concurrency bound as an `Option`.
    ///
    /// - `None` → unlimited (no semaphore)
    /// - `Some(n)` → at most `n` concurrent dispatches
    #[inline]
    pub fn concurrency_limit(&self) -> Option<usize> {
        if self.pool_size == 0 {
            None
        } else {
            Some(self.pool_size)
        }
    }

    /// Returns the default per-dispatch timeout as an `Option`.
    #[inline]
    pub fn default_run_timeout(&self) -> Option<Duration> {
        if self.run_timeout == Duration::ZERO {
            None
        } else {
            Some(self.run_timeout)
        }
    }

    /// Returns the default post-execution delay as an `Option`.
    #[inline]
    pub fn default_delay(&self) -> Option<Duration> {
        if self.delay_time == Duration::ZERO {
            None
        } else {
            Some(self.delay_time)
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `tick = 1s`, `pool_size = 0` (unlimited), `policy = Simple`
    /// - `grace = 30s`, `join_timeout = 5s`
    /// - `register_mode = Strict`
    /// - `result_channel = "waiter"`, `result_topic = "waiter.result"`
    /// - `delay_time = 0s`, `run_timeout = 0s` (no defaults applied)
    /// - `weights = PriorityWeights::default()` (300s cap, 0.3 weight)
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            pool_size: 0,
            policy: WaiterPolicy::Simple,
            grace: Duration::from_secs(30),
            join_timeout: Duration::from_secs(5),
            register_mode: RegisterMode::Strict,
            result_channel: "waiter".to_string(),
            result_topic: "waiter.result".to_string(),
            delay_time: Duration::ZERO,
            run_timeout: Duration::ZERO,
            weights: PriorityWeights::default(),
        }
    }
}
