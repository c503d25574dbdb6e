//! Event channel: a named queue plus its topic → reactor bindings.
//!
//! A channel owns exactly one [`EventFifo`] and the reactors registered
//! against its topics. Non-public channels never accept raw events from
//! the publish surface; their reactors can only be triggered directly.

use std::collections::HashMap;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::debug;

use crate::events::{EventFifo, EventNode, PriorityWeights};
use crate::reactors::EventReactor;

/// Named grouping of a queue and the reactors consuming from it.
pub struct EventChannel {
    name: String,
    public: bool,
    fifo: Mutex<EventFifo>,
    reactors: RwLock<HashMap<String, Vec<EventReactor>>>,
}

impl EventChannel {
    /// Creates a channel with the given visibility and priority weights.
    pub fn new(name: impl Into<String>, public: bool, weights: PriorityWeights) -> Self {
        Self {
            name: name.into(),
            public,
            fifo: Mutex::new(EventFifo::new(weights)),
            reactors: RwLock::new(HashMap::new()),
        }
    }

    /// The channel's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if external callers may push raw events onto the queue.
    pub fn is_public(&self) -> bool {
        self.public
    }

    /// Admits an event onto the channel's queue.
    ///
    /// Visibility is enforced by the publish surface
    /// ([`ChannelManager`](crate::events::ChannelManager)); internal
    /// callers (requeues, the scheduler's result path) use this directly.
    pub async fn push_event(&self, node: EventNode) {
        self.fifo.lock().await.push(node);
    }

    /// Replace-or-admit: idempotent update keyed on `(topic, content)`.
    pub async fn refresh_event(&self, node: EventNode) -> bool {
        self.fifo.lock().await.replace(node)
    }

    /// Pops the highest-effective-priority event, if any.
    pub async fn pop_event(&self, now: Instant) -> Option<EventNode> {
        self.fifo.lock().await.pop(now)
    }

    /// Removes expired events and fires each expire callback exactly once.
    ///
    /// Returns the number of expired events. Expired events are never
    /// dispatched.
    pub async fn sweep_expired(&self, now: Instant) -> usize {
        let expired = self.fifo.lock().await.take_expired(now);
        let count = expired.len();
        for node in expired {
            debug!(channel = %self.name, topic = %node.topic, "event expired before dispatch");
            if let Some(cb) = node.expire_callback.clone() {
                cb(&node);
            }
        }
        count
    }

    /// Number of queued events.
    pub async fn queue_len(&self) -> usize {
        self.fifo.lock().await.len()
    }

    /// Binds a reactor to a topic on this channel.
    ///
    /// Registration order is preserved; it is the tiebreak for
    /// priority-ordered resolution and defines "first" for first-wins.
    pub async fn bind_reactor(&self, topic: impl Into<String>, reactor: EventReactor) {
        let mut reactors = self.reactors.write().await;
        reactors.entry(topic.into()).or_default().push(reactor);
    }

    /// Returns the reactors bound to `topic`, in registration order.
    pub async fn reactors_for(&self, topic: &str) -> Vec<EventReactor> {
        let reactors = self.reactors.read().await;
        reactors.get(topic).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn expired_events_fire_callback_once_and_are_removed() {
        let ch = EventChannel::new("c", true, PriorityWeights::default());
        let fired = Arc::new(AtomicUsize::new(0));
        let f = Arc::clone(&fired);

        ch.push_event(
            EventNode::new("c", "t", json!(1))
                .with_timeout(Duration::from_secs(1))
                .on_expire(move |_| {
                    f.fetch_add(1, Ordering::SeqCst);
                }),
        )
        .await;

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(ch.sweep_expired(Instant::now()).await, 1);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(ch.queue_len().await, 0);

        // A second sweep finds nothing.
        assert_eq!(ch.sweep_expired(Instant::now()).await, 0);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn reactors_bind_in_registration_order() {
        let ch = EventChannel::new("c", true, PriorityWeights::default());
        for name in ["r1", "r2", "r3"] {
            ch.bind_reactor("t", EventReactor::builder(name).build(|_| async { Ok(()) }))
                .await;
        }
        let names: Vec<_> = ch
            .reactors_for("t")
            .await
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(names, vec!["r1", "r2", "r3"]);
        assert!(ch.reactors_for("other").await.is_empty());
    }
}
