//! Dispatch disciplines for the scheduling loop.

/// How the waiter admits workers into flight on each tick.
///
/// All three disciplines share the same invariant: a worker never has more
/// than one dispatch in flight. They differ in how concurrency across
/// *different* workers is bounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WaiterPolicy {
    /// Best-effort throughput (default).
    ///
    /// The permit pool grows automatically to the number of registered
    /// workers, so every idle worker is dispatched each tick. `pool_size`
    /// only sets the initial pool.
    #[default]
    Simple,

    /// Hard concurrency bound with a tick barrier.
    ///
    /// At most `pool_size` dispatches run concurrently, and a new batch is
    /// admitted only when the previous batch has fully drained. Workers
    /// that don't fit a batch wait for a later tick.
    Safe,

    /// Unbounded: every idle worker is dispatched on its own task with no
    /// permit accounting at all.
    Stable,
}

impl WaiterPolicy {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            WaiterPolicy::Simple => "simple",
            WaiterPolicy::Safe => "safe",
            WaiterPolicy::Stable => "stable",
        }
    }
}
