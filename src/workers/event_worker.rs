//! The event worker: a scheduler-managed worker that drains the bus.
//!
//! Once per tick the event worker walks every channel, sweeps expired
//! events, pops queued events in effective-priority order, resolves the
//! matching reactors, and fans their executions out onto concurrent tasks.
//! The fan-out is joined with a bounded timeout before the worker returns
//! control to the scheduler — the only synchronization barrier inside a
//! tick.
//!
//! A channel drains at most the number of events queued when the drain
//! starts, so an event requeued for lack of reactors retries on a later
//! tick instead of burning its whole budget immediately.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::WorkerError;
use crate::events::ChannelManager;
use crate::workers::{Worker, WorkerProps, WorkerResult};

/// Worker name the event worker registers under.
pub const EVENT_WORKER_NAME: &str = "event-worker";

/// Loop worker draining every channel's queue once per tick.
pub struct EventWorker {
    bus: Arc<ChannelManager>,
    join_timeout: Duration,
}

impl EventWorker {
    /// Creates an event worker over the given bus.
    pub fn new(bus: Arc<ChannelManager>, join_timeout: Duration) -> Self {
        Self { bus, join_timeout }
    }

    /// Descriptor the event worker is conventionally registered with.
    pub fn props() -> WorkerProps {
        WorkerProps::new(EVENT_WORKER_NAME).looped()
    }

    /// Drains one channel; returns (dispatched, expired, dropped).
    async fn drain_channel(
        &self,
        channel: &Arc<crate::events::EventChannel>,
        tasks: &mut JoinSet<()>,
    ) -> (usize, usize, usize) {
        let now = Instant::now();
        let expired = channel.sweep_expired(now).await;
        let mut dispatched = 0usize;
        let mut dropped = 0usize;
        let mut requeue = Vec::new();

        // Bound the drain to the queue length at entry; requeued nodes are
        // held back so they are not re-examined this tick.
        let budget = channel.queue_len().await;
        for _ in 0..budget {
            let Some(mut node) = channel.pop_event(Instant::now()).await else {
                break;
            };

            let reactors = self.bus.resolve(channel, &node).await;
            if reactors.is_empty() {
                if node.retry_times > 0 {
                    node.retry_times -= 1;
                    requeue.push(node);
                } else {
                    warn!(
                        channel = channel.name(),
                        topic = %node.topic,
                        "no reactor matched, dropping event"
                    );
                    dropped += 1;
                }
                continue;
            }

            for reactor in reactors {
                let topic = node.topic.clone();
                let content = node.content.clone();
                tasks.spawn(async move {
                    let _ = reactor.execute(&topic, &content).await;
                });
                dispatched += 1;
            }
        }

        for node in requeue {
            channel.push_event(node).await;
        }

        (dispatched, expired, dropped)
    }
}

#[async_trait]
impl Worker for EventWorker {
    fn name(&self) -> &str {
        EVENT_WORKER_NAME
    }

    async fn execute(&self, ctx: CancellationToken) -> Result<WorkerResult, WorkerError> {
        let mut tasks = JoinSet::new();
        let mut dispatched = 0usize;
        let mut expired = 0usize;
        let mut dropped = 0usize;

        for channel in self.bus.channels().await {
            if ctx.is_cancelled() {
                break;
            }
            let (d, e, x) = self.drain_channel(&channel, &mut tasks).await;
            dispatched += d;
            expired += e;
            dropped += x;
        }

        // Join all reactor executions spawned this tick, bounded.
        let join_all = async {
            while tasks.join_next().await.is_some() {}
        };
        if tokio::time::timeout(self.join_timeout, join_all).await.is_err() {
            warn!(
                timeout = ?self.join_timeout,
                "reactor join timed out, aborting stragglers"
            );
            tasks.abort_all();
        }

        debug!(dispatched, expired, dropped, "event worker tick complete");
        Ok(WorkerResult::ok(
            EVENT_WORKER_NAME,
            "event.drained",
            json!({ "dispatched": dispatched, "expired": expired, "dropped": dropped }),
        ))
    }
}
