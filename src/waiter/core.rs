//! The waiter: tick-driven dispatch loop over the worker registry.
//!
//! Every tick the waiter collects registered workers and dispatches each
//! idle one onto its own task, subject to the configured
//! [`WaiterPolicy`]. A dispatch record held per worker guarantees at most
//! one execution in flight per name; the record is inserted under the
//! same write lock that spawns the task, so the task's own removal can
//! never race ahead of the insertion.
//!
//! Per dispatch the waiter:
//! 1. runs `on_create` before the worker's first execution,
//! 2. executes the worker under a child cancellation token, upgrading a
//!    `run_timeout` expiry into real cancellation of that token,
//! 3. catches panics at the dispatch boundary,
//! 4. publishes the [`WorkerResult`] to the configured result channel,
//! 5. sleeps the worker's `delay_time` (cancellable) before it becomes
//!    idle again,
//! 6. unregisters one-shot workers and runs their `on_destroy`.
//!
//! Shutdown cancels the root token, waits up to `grace` for in-flight
//! dispatches to drain, then aborts stragglers and reports them in
//! [`RuntimeError::GraceExceeded`].

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::{OwnedSemaphorePermit, RwLock, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{RuntimeError, WorkerError};
use crate::events::ChannelManager;
use crate::waiter::{WaiterPolicy, wait_for_shutdown_signal};
use crate::workers::{WorkerProps, WorkerRef, WorkerRegistry, WorkerResult};

struct DispatchRecord {
    dispatched_at: Instant,
    handle: JoinHandle<()>,
}

/// Tick-driven scheduler over a [`WorkerRegistry`].
///
/// Owns the dispatch records, the concurrency permits, and the root
/// cancellation token. Results of every dispatch are published to the
/// event bus (`cfg.result_channel` / `cfg.result_topic`) so reactors can
/// observe scheduler activity.
pub struct Waiter {
    cfg: Config,
    registry: Arc<WorkerRegistry>,
    bus: Arc<ChannelManager>,
    records: Arc<RwLock<HashMap<String, DispatchRecord>>>,
    semaphore: Option<Arc<Semaphore>>,
    issued: AtomicUsize,
    channel_ready: AtomicBool,
    token: CancellationToken,
}

impl Waiter {
    /// Creates a waiter over the given registry and bus.
    ///
    /// The permit pool follows the policy: `Stable` never creates one,
    /// otherwise `cfg.pool_size` permits are issued up front (`0` =
    /// unlimited, no pool).
    pub fn new(cfg: Config, registry: Arc<WorkerRegistry>, bus: Arc<ChannelManager>) -> Self {
        let semaphore = match cfg.policy {
            WaiterPolicy::Stable => None,
            _ => cfg.concurrency_limit().map(|n| Arc::new(Semaphore::new(n))),
        };
        let issued = AtomicUsize::new(if semaphore.is_some() { cfg.pool_size } else { 0 });
        Self {
            cfg,
            registry,
            bus,
            records: Arc::new(RwLock::new(HashMap::new())),
            semaphore,
            issued,
            channel_ready: AtomicBool::new(false),
            token: CancellationToken::new(),
        }
    }

    /// Returns a clone of the root cancellation token.
    ///
    /// Cancelling it stops the run loop and starts the drain sequence.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Number of dispatches currently in flight.
    pub async fn in_flight(&self) -> usize {
        self.records.read().await.len()
    }

    /// Runs the scheduling loop until the token is cancelled or a
    /// termination signal arrives, then drains in-flight work.
    pub async fn run(&self) -> Result<(), RuntimeError> {
        info!(
            policy = self.cfg.policy.as_label(),
            tick = ?self.cfg.tick,
            "waiter started"
        );

        let signal = wait_for_shutdown_signal();
        tokio::pin!(signal);

        let mut ticker = tokio::time::interval(self.cfg.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.token.cancelled() => break,
                sig = &mut signal => {
                    if let Err(err) = sig {
                        warn!(error = %err, "signal listener failed, shutting down");
                    }
                    self.token.cancel();
                    break;
                }
                _ = ticker.tick() => self.tick_once().await,
            }
        }

        self.drain().await
    }

    /// Cancels the root token and drains in-flight dispatches.
    ///
    /// Safe to call concurrently with [`run`](Waiter::run); whichever
    /// drain finishes last observes an already-empty record table.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.token.cancel();
        self.drain().await
    }

    /// Performs exactly one scheduling pass.
    ///
    /// Exposed so tests and embedders can drive the waiter without the
    /// timer loop.
    pub async fn tick_once(&self) {
        self.ensure_result_channel().await;
        let workers = self.registry.get_all().await;

        match self.cfg.policy {
            WaiterPolicy::Safe => {
                // Batch barrier: admit new work only once the previous
                // batch has fully drained.
                if !self.records.read().await.is_empty() {
                    return;
                }
            }
            WaiterPolicy::Simple => {
                // Grow the pool to the active worker count so every idle
                // worker fits a tick.
                if let Some(sem) = &self.semaphore {
                    let issued = self.issued.load(Ordering::Acquire);
                    if workers.len() > issued {
                        sem.add_permits(workers.len() - issued);
                        self.issued.store(workers.len(), Ordering::Release);
                    }
                }
            }
            WaiterPolicy::Stable => {}
        }

        for (worker, props) in workers {
            if self.records.read().await.contains_key(props.name()) {
                continue;
            }
            let permit = match &self.semaphore {
                None => None,
                Some(sem) => match Arc::clone(sem).try_acquire_owned() {
                    Ok(p) => Some(p),
                    Err(_) => {
                        warn!(worker = props.name(), "no permit free, deferred to a later tick");
                        continue;
                    }
                },
            };
            self.dispatch(worker, props, permit).await;
        }
    }

    async fn ensure_result_channel(&self) {
        if !self.channel_ready.swap(true, Ordering::AcqRel) {
            self.bus
                .register_channel(&self.cfg.result_channel, true)
                .await;
        }
    }

    /// Spawns one dispatch and records it.
    ///
    /// The record is inserted while still holding the write lock taken
    /// before the spawn, so the spawned task's removal of its own record
    /// blocks until the insertion is visible.
    async fn dispatch(
        &self,
        worker: WorkerRef,
        props: WorkerProps,
        permit: Option<OwnedSemaphorePermit>,
    ) {
        let mut records = self.records.write().await;
        if records.contains_key(props.name()) {
            return;
        }

        let name = props.name().to_string();
        // The first-run flag lives in the registry entry, so a fresh
        // instance registered under a reused name gets its own on_create.
        let first_run = self.registry.mark_created(&name).await;
        let child = self.token.child_token();
        let parent = self.token.clone();
        let records_handle = Arc::clone(&self.records);
        let registry = Arc::clone(&self.registry);
        let bus = Arc::clone(&self.bus);
        let result_channel = self.cfg.result_channel.clone();
        let result_topic = self.cfg.result_topic.clone();

        debug!(worker = %name, first_run, "dispatching worker");
        let task_name = name.clone();
        let handle = tokio::spawn(async move {
            let _permit = permit;
            if first_run {
                worker.on_create().await;
            }

            let result = run_worker(&worker, &props, child).await;

            match serde_json::to_value(&result) {
                Ok(content) => {
                    if let Err(err) = bus.publish(&result_channel, &result_topic, content).await {
                        warn!(
                            worker = %task_name,
                            error = %err,
                            label = err.as_label(),
                            "failed to publish worker result"
                        );
                    }
                }
                Err(err) => {
                    warn!(worker = %task_name, error = %err, "worker result not serializable");
                }
            }

            if props.is_loop()
                && let Some(delay) = props.delay_time()
            {
                tokio::select! {
                    _ = parent.cancelled() => {}
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            records_handle.write().await.remove(&task_name);

            if !props.is_loop()
                && let Some((w, _)) = registry.unregister(&task_name).await
            {
                w.on_destroy(Some(&result)).await;
            }
        });

        records.insert(
            name,
            DispatchRecord {
                dispatched_at: Instant::now(),
                handle,
            },
        );
    }

    /// Waits for in-flight dispatches to finish, bounded by `cfg.grace`,
    /// then destroys whatever is still registered.
    async fn drain(&self) -> Result<(), RuntimeError> {
        let grace = self.cfg.grace;
        let wait_empty = async {
            loop {
                if self.records.read().await.is_empty() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        };

        let drained = if tokio::time::timeout(grace, wait_empty).await.is_err() {
            let mut records = self.records.write().await;
            let mut stuck: Vec<String> = records.keys().cloned().collect();
            stuck.sort_unstable();
            for (name, record) in records.drain() {
                error!(
                    worker = %name,
                    running_for = ?record.dispatched_at.elapsed(),
                    "worker did not stop within grace, aborting"
                );
                record.handle.abort();
            }
            Err(RuntimeError::GraceExceeded { grace, stuck })
        } else {
            Ok(())
        };

        // Unregistering first makes concurrent drains destroy each worker
        // exactly once: only the caller that removes the entry runs the hook.
        for (worker, props) in self.registry.get_all().await {
            if self.registry.unregister(props.name()).await.is_some() {
                worker.on_destroy(None).await;
            }
        }

        info!("waiter stopped");
        drained
    }
}

/// Executes one dispatch: timeout enforcement, cancellation upgrade, and
/// panic isolation. Always yields a publishable result.
async fn run_worker(
    worker: &WorkerRef,
    props: &WorkerProps,
    ctx: CancellationToken,
) -> WorkerResult {
    let name = props.name();
    let body = std::panic::AssertUnwindSafe(worker.execute(ctx.clone())).catch_unwind();

    let outcome = match props.run_timeout() {
        Some(limit) => match tokio::time::timeout(limit, body).await {
            Ok(joined) => joined,
            Err(_) => {
                // The dispatch future is dropped here; cancelling the
                // child token stops any tasks the worker spawned under it.
                ctx.cancel();
                warn!(worker = %name, timeout = ?limit, "run timeout exceeded, dispatch cancelled");
                return WorkerResult::timed_out(name, limit);
            }
        },
        None => body.await,
    };

    match outcome {
        Ok(Ok(result)) => result,
        Ok(Err(err)) => {
            warn!(worker = %name, error = %err, label = err.as_label(), "worker failed");
            WorkerResult::from_error(name, &err)
        }
        Err(payload) => {
            let info = panic_info(payload);
            error!(worker = %name, info = %info, "worker panicked");
            WorkerResult::from_error(name, &WorkerError::Fatal { error: info })
        }
    }
}

fn panic_info(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workers::{Worker, WorkerFn};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    fn init_tracing() {
        use tracing_subscriber::EnvFilter;
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn setup(cfg: Config) -> (Waiter, Arc<WorkerRegistry>, Arc<ChannelManager>) {
        init_tracing();
        let registry = Arc::new(WorkerRegistry::new(cfg.register_mode));
        let bus = Arc::new(ChannelManager::new(cfg.weights));
        let waiter = Waiter::new(cfg, Arc::clone(&registry), Arc::clone(&bus));
        (waiter, registry, bus)
    }

    struct Gated {
        name: &'static str,
        hits: Arc<AtomicUsize>,
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl Worker for Gated {
        fn name(&self) -> &str {
            self.name
        }

        async fn execute(&self, _ctx: CancellationToken) -> Result<WorkerResult, WorkerError> {
            self.hits.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            Ok(WorkerResult::ok(self.name, "gated.done", json!(null)))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn one_shot_worker_runs_once_and_unregisters() {
        let (waiter, registry, bus) = setup(Config::default());
        registry
            .register(
                WorkerFn::arc("once", |_ctx| async {
                    Ok(WorkerResult::ok("once", "once.done", json!({"n": 1})))
                }),
                WorkerProps::new("once"),
            )
            .await
            .unwrap();

        waiter.tick_once().await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(registry.is_empty().await, "one-shot worker must unregister");
        assert_eq!(waiter.in_flight().await, 0);

        let ch = bus.register_channel("waiter", true).await;
        let node = ch.pop_event(Instant::now()).await.expect("result published");
        assert_eq!(node.topic, "waiter.result");
        assert_eq!(node.content["worker"], "once");
        assert_eq!(node.content["content"]["n"], 1);
    }

    #[tokio::test(start_paused = true)]
    async fn at_most_one_dispatch_in_flight_per_worker() {
        let (waiter, registry, _bus) = setup(Config::default());
        let hits = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());
        registry
            .register(
                Arc::new(Gated {
                    name: "gated",
                    hits: Arc::clone(&hits),
                    gate: Arc::clone(&gate),
                }),
                WorkerProps::new("gated").looped(),
            )
            .await
            .unwrap();

        waiter.tick_once().await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        waiter.tick_once().await;
        waiter.tick_once().await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1, "record must block re-dispatch");

        gate.notify_one();
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(waiter.in_flight().await, 0);

        // Idle again: the next tick re-dispatches the loop worker.
        waiter.tick_once().await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        gate.notify_one();
    }

    #[tokio::test(start_paused = true)]
    async fn run_timeout_stops_dispatch_and_reports_timeout() {
        let (waiter, registry, bus) = setup(Config::default());
        let beats = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&beats);
        registry
            .register(
                WorkerFn::arc("slow", move |_ctx| {
                    let counter = Arc::clone(&counter);
                    async move {
                        loop {
                            tokio::time::sleep(Duration::from_millis(300)).await;
                            counter.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                }),
                WorkerProps::new("slow").with_run_timeout(Duration::from_secs(1)),
            )
            .await
            .unwrap();

        waiter.tick_once().await;
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(waiter.in_flight().await, 0);
        let observed = beats.load(Ordering::SeqCst);
        assert!(observed >= 2, "worker should have run until the deadline");

        // The dispatch future was dropped at the deadline; no beats after.
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(beats.load(Ordering::SeqCst), observed);

        let ch = bus.register_channel("waiter", true).await;
        let node = ch.pop_event(Instant::now()).await.expect("result published");
        assert_eq!(node.content["outcome"]["outcome"], "timed_out");
    }

    #[tokio::test(start_paused = true)]
    async fn worker_panic_is_isolated_and_reported() {
        let (waiter, registry, bus) = setup(Config::default());
        registry
            .register(
                WorkerFn::arc("explosive", |_ctx| async { panic!("boom") }),
                WorkerProps::new("explosive"),
            )
            .await
            .unwrap();

        waiter.tick_once().await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(waiter.in_flight().await, 0);
        let ch = bus.register_channel("waiter", true).await;
        let node = ch.pop_event(Instant::now()).await.expect("result published");
        assert_eq!(node.content["outcome"]["outcome"], "failed");
        assert!(
            node.content["outcome"]["detail"]
                .as_str()
                .unwrap()
                .contains("boom")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn safe_policy_holds_new_work_until_batch_drains() {
        let cfg = Config {
            policy: WaiterPolicy::Safe,
            pool_size: 2,
            ..Config::default()
        };
        let (waiter, registry, _bus) = setup(cfg);

        let hits = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());
        registry
            .register(
                Arc::new(Gated {
                    name: "a-held",
                    hits: Arc::clone(&hits),
                    gate: Arc::clone(&gate),
                }),
                WorkerProps::new("a-held"),
            )
            .await
            .unwrap();
        let fast_hits = Arc::new(AtomicUsize::new(0));
        for name in ["b-fast", "c-fast"] {
            let fast_hits = Arc::clone(&fast_hits);
            registry
                .register(
                    WorkerFn::arc(name, move |_ctx| {
                        let fast_hits = Arc::clone(&fast_hits);
                        async move {
                            fast_hits.fetch_add(1, Ordering::SeqCst);
                            Ok(WorkerResult::ok(name, "fast.done", json!(null)))
                        }
                    }),
                    WorkerProps::new(name),
                )
                .await
                .unwrap();
        }

        // First batch: pool of 2 admits a-held and b-fast; c-fast waits.
        waiter.tick_once().await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(fast_hits.load(Ordering::SeqCst), 1);

        // b-fast finished but a-held is still in flight: barrier holds.
        waiter.tick_once().await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(fast_hits.load(Ordering::SeqCst), 1);

        gate.notify_one();
        tokio::time::sleep(Duration::from_millis(5)).await;
        waiter.tick_once().await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(fast_hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn simple_policy_grows_pool_to_worker_count() {
        let cfg = Config {
            policy: WaiterPolicy::Simple,
            pool_size: 1,
            ..Config::default()
        };
        let (waiter, registry, _bus) = setup(cfg);

        let hits = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());
        for name in ["g1", "g2"] {
            registry
                .register(
                    Arc::new(Gated {
                        name,
                        hits: Arc::clone(&hits),
                        gate: Arc::clone(&gate),
                    }),
                    WorkerProps::new(name),
                )
                .await
                .unwrap();
        }

        waiter.tick_once().await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(
            hits.load(Ordering::SeqCst),
            2,
            "pool must grow past its initial size"
        );
        gate.notify_waiters();
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_aborts_workers_exceeding_grace() {
        let cfg = Config {
            grace: Duration::from_secs(1),
            ..Config::default()
        };
        let (waiter, registry, _bus) = setup(cfg);
        registry
            .register(
                WorkerFn::arc("stubborn", |_ctx| async {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(WorkerResult::ok("stubborn", "never", json!(null)))
                }),
                WorkerProps::new("stubborn"),
            )
            .await
            .unwrap();

        waiter.tick_once().await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(waiter.in_flight().await, 1);

        let err = waiter.shutdown().await.unwrap_err();
        match err {
            RuntimeError::GraceExceeded { stuck, .. } => {
                assert_eq!(stuck, vec!["stubborn".to_string()]);
            }
        }
        assert_eq!(waiter.in_flight().await, 0);
    }

    struct Hooked {
        created: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Worker for Hooked {
        fn name(&self) -> &str {
            "hooked"
        }

        async fn on_create(&self) {
            self.created.fetch_add(1, Ordering::SeqCst);
        }

        async fn execute(&self, _ctx: CancellationToken) -> Result<WorkerResult, WorkerError> {
            Ok(WorkerResult::ok("hooked", "hooked.done", json!(null)))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn reregistered_worker_gets_its_own_on_create() {
        let (waiter, registry, _bus) = setup(Config::default());

        let first = Arc::new(AtomicUsize::new(0));
        registry
            .register(
                Arc::new(Hooked {
                    created: Arc::clone(&first),
                }),
                WorkerProps::new("hooked"),
            )
            .await
            .unwrap();
        waiter.tick_once().await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty().await);

        // A fresh instance under the reused name starts its own lifecycle.
        let second = Arc::new(AtomicUsize::new(0));
        registry
            .register(
                Arc::new(Hooked {
                    created: Arc::clone(&second),
                }),
                WorkerProps::new("hooked"),
            )
            .await
            .unwrap();
        waiter.tick_once().await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(
            second.load(Ordering::SeqCst),
            1,
            "a fresh worker instance must get its own on_create"
        );
        assert_eq!(first.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_shutdowns_destroy_each_worker_once() {
        struct CountedDestroy {
            destroyed: Arc<AtomicUsize>,
        }

        #[async_trait]
        impl Worker for CountedDestroy {
            fn name(&self) -> &str {
                "counted"
            }

            async fn execute(&self, _ctx: CancellationToken) -> Result<WorkerResult, WorkerError> {
                Ok(WorkerResult::ok("counted", "counted.done", json!(null)))
            }

            async fn on_destroy(&self, _last: Option<&WorkerResult>) {
                self.destroyed.fetch_add(1, Ordering::SeqCst);
            }
        }

        let (waiter, registry, _bus) = setup(Config::default());
        let destroyed = Arc::new(AtomicUsize::new(0));
        registry
            .register(
                Arc::new(CountedDestroy {
                    destroyed: Arc::clone(&destroyed),
                }),
                WorkerProps::new("counted").looped(),
            )
            .await
            .unwrap();

        let (a, b) = tokio::join!(waiter.shutdown(), waiter.shutdown());
        a.unwrap();
        b.unwrap();
        assert_eq!(
            destroyed.load(Ordering::SeqCst),
            1,
            "only the drain that unregisters the worker may destroy it"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_destroys_remaining_loop_workers() {
        struct Tracked {
            destroyed: Arc<AtomicBool>,
        }

        #[async_trait]
        impl Worker for Tracked {
            fn name(&self) -> &str {
                "tracked"
            }

            async fn execute(&self, _ctx: CancellationToken) -> Result<WorkerResult, WorkerError> {
                Ok(WorkerResult::ok("tracked", "tracked.done", json!(null)))
            }

            async fn on_destroy(&self, _last: Option<&WorkerResult>) {
                self.destroyed.store(true, Ordering::SeqCst);
            }
        }

        let (waiter, registry, _bus) = setup(Config::default());
        let destroyed = Arc::new(AtomicBool::new(false));
        registry
            .register(
                Arc::new(Tracked {
                    destroyed: Arc::clone(&destroyed),
                }),
                WorkerProps::new("tracked").looped(),
            )
            .await
            .unwrap();

        waiter.shutdown().await.unwrap();
        assert!(destroyed.load(Ordering::SeqCst));
        assert!(registry.is_empty().await);
    }
}
