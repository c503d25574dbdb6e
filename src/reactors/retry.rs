//! Retry policies for reactor executions.
//!
//! [`RetryPolicy`] determines how many handler attempts a reactor makes
//! before reporting failure.
//!
//! - [`RetryPolicy::Never`] - exactly one attempt, fail fast.
//! - [`RetryPolicy::Once`] - one retry after a failure (≤ 2 attempts).
//! - [`RetryPolicy::Times`] - up to `n` attempts.
//! - [`RetryPolicy::Forever`] - until success; bounded only by the
//!   reactor's timeout. A `Forever` reactor without a timeout can spin
//!   indefinitely, which is a caller error.

/// Per-reactor retry discipline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Exactly one attempt; report failure immediately.
    Never,
    /// One retry after a failure: at most two attempts total (default).
    #[default]
    Once,
    /// Up to `n` attempts total (`n` is clamped to a minimum of 1).
    Times(u32),
    /// Retry until success. Pair with a reactor timeout.
    Forever,
}

impl RetryPolicy {
    /// Maximum number of attempts, or `None` when unbounded.
    pub fn max_attempts(&self) -> Option<u32> {
        match self {
            RetryPolicy::Never => Some(1),
            RetryPolicy::Once => Some(2),
            RetryPolicy::Times(n) => Some((*n).max(1)),
            RetryPolicy::Forever => None,
        }
    }
}
