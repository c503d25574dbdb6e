//! Channel manager: the publish surface, authorization table, and
//! dispatch resolution.
//!
//! The [`ChannelManager`] is the in-process boundary of the event bus. It
//! owns the [`ChannelRegistry`] plus a per-reactor table of the channels
//! each reactor is authorized to observe, and resolves which reactors an
//! event fans out to according to its
//! [`ResponseMechanism`](crate::events::ResponseMechanism).
//!
//! ## Authorization
//! Registering a reactor on a channel authorizes it for that channel
//! automatically; additional grants go through [`ChannelManager::authorize`].
//! A reactor is never handed an event from a channel outside its grant
//! set, even when topics coincide — cross-channel delivery is rejected
//! with a diagnostic.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::PublishError;
use crate::events::{ChannelRegistry, EventChannel, EventNode, PriorityWeights, ResponseMechanism};
use crate::reactors::EventReactor;

/// Publish surface and dispatch resolver of the event bus.
///
/// Explicitly constructed and dependency-injected into the scheduler and
/// the event worker; never a process-wide singleton, so tests stay
/// hermetic.
pub struct ChannelManager {
    registry: ChannelRegistry,
    grants: RwLock<HashMap<String, HashSet<String>>>,
}

impl ChannelManager {
    /// Creates a manager whose channels use the given priority weights.
    pub fn new(weights: PriorityWeights) -> Self {
        Self {
            registry: ChannelRegistry::new(weights),
            grants: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a manager with default weights.
    pub fn with_defaults() -> Self {
        Self::new(PriorityWeights::default())
    }

    /// Registers (or returns) the named channel.
    pub async fn register_channel(&self, name: &str, public: bool) -> Arc<EventChannel> {
        self.registry.get_or_create(name, public).await
    }

    /// Binds a reactor to `topic` on `channel` (get-or-create, public by
    /// default) and authorizes the reactor for that channel.
    pub async fn register_reactor(&self, channel: &str, topic: &str, reactor: EventReactor) {
        let ch = self.registry.get_or_create(channel, true).await;
        self.authorize(reactor.name(), [channel]).await;
        ch.bind_reactor(topic, reactor).await;
    }

    /// Grants `reactor` the right to observe the given channels.
    pub async fn authorize<I, S>(&self, reactor: &str, channels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut grants = self.grants.write().await;
        let set = grants.entry(reactor.to_string()).or_default();
        for ch in channels {
            set.insert(ch.into());
        }
    }

    /// True if `reactor` may observe `channel`.
    pub async fn is_authorized(&self, reactor: &str, channel: &str) -> bool {
        let grants = self.grants.read().await;
        grants.get(reactor).is_some_and(|set| set.contains(channel))
    }

    /// Enqueues an event node onto its channel.
    ///
    /// Fails fast on unknown channels (configuration error) and rejects
    /// raw pushes onto non-public channels.
    pub async fn publish_node(&self, node: EventNode) -> Result<(), PublishError> {
        let Some(ch) = self.registry.get(&node.channel).await else {
            return Err(PublishError::ChannelNotFound {
                channel: node.channel.clone(),
            });
        };
        if !ch.is_public() {
            return Err(PublishError::ChannelPrivate {
                channel: node.channel.clone(),
            });
        }
        debug!(channel = %node.channel, topic = %node.topic, "event published");
        ch.push_event(node).await;
        Ok(())
    }

    /// Convenience publish of a plain event.
    pub async fn publish(
        &self,
        channel: &str,
        topic: &str,
        content: Value,
    ) -> Result<(), PublishError> {
        self.publish_node(EventNode::new(channel, topic, content))
            .await
    }

    /// Idempotent re-publication: overwrites the queued copy of the same
    /// logical event, or enqueues it when absent.
    pub async fn refresh(&self, node: EventNode) -> Result<(), PublishError> {
        let Some(ch) = self.registry.get(&node.channel).await else {
            return Err(PublishError::ChannelNotFound {
                channel: node.channel.clone(),
            });
        };
        if !ch.is_public() {
            return Err(PublishError::ChannelPrivate {
                channel: node.channel.clone(),
            });
        }
        ch.refresh_event(node).await;
        Ok(())
    }

    /// Directly executes the reactors bound to `topic` on `channel`,
    /// bypassing the queue.
    ///
    /// This is the only externally reachable path for non-public channels.
    pub async fn trigger(
        &self,
        channel: &str,
        topic: &str,
        content: Value,
    ) -> Result<(), PublishError> {
        let Some(ch) = self.registry.get(channel).await else {
            return Err(PublishError::ChannelNotFound {
                channel: channel.to_string(),
            });
        };
        let node = EventNode::new(channel, topic, content);
        let reactors = self.resolve(&ch, &node).await;
        if reactors.is_empty() {
            return Err(PublishError::NoReactor {
                channel: channel.to_string(),
                topic: topic.to_string(),
            });
        }
        for reactor in reactors {
            let _ = reactor.execute(&node.topic, &node.content).await;
        }
        Ok(())
    }

    /// Returns every registered channel (iteration order unspecified).
    pub async fn channels(&self) -> Vec<Arc<EventChannel>> {
        self.registry.all().await
    }

    /// Returns registered channel names, sorted.
    pub async fn channel_names(&self) -> Vec<String> {
        self.registry.names().await
    }

    /// Resolves the reactors an event fans out to.
    ///
    /// Applies the channel-authorization filter first, then the node's
    /// response mechanism. Unauthorized reactors are skipped with a
    /// diagnostic and never receive the event.
    pub async fn resolve(&self, channel: &EventChannel, node: &EventNode) -> Vec<EventReactor> {
        let bound = channel.reactors_for(&node.topic).await;
        let mut matched = Vec::with_capacity(bound.len());
        for reactor in bound {
            if self.is_authorized(reactor.name(), channel.name()).await {
                matched.push(reactor);
            } else {
                warn!(
                    reactor = reactor.name(),
                    channel = channel.name(),
                    topic = %node.topic,
                    "reactor not authorized for channel, skipping"
                );
            }
        }
        if matched.is_empty() {
            return matched;
        }

        match node.mechanism {
            ResponseMechanism::FirstWins => {
                matched.truncate(1);
                matched
            }
            ResponseMechanism::PriorityOrder => {
                // Stable sort: registration order breaks priority ties.
                matched.sort_by_key(|r| std::cmp::Reverse(r.priority()));
                matched
            }
            ResponseMechanism::Broadcast => matched,
            ResponseMechanism::Named => match &node.reactor_name {
                Some(target) => matched
                    .into_iter()
                    .filter(|r| r.name() == target.as_str())
                    .collect(),
                None => {
                    warn!(topic = %node.topic, "named mechanism without a reactor name");
                    Vec::new()
                }
            },
        }
    }
}

impl Default for ChannelManager {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactors::RetryPolicy;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_reactor(name: &str, hits: Arc<AtomicUsize>) -> EventReactor {
        EventReactor::builder(name)
            .with_retry(RetryPolicy::Never)
            .build(move |_req| {
                let hits = Arc::clone(&hits);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
    }

    #[tokio::test]
    async fn publish_to_unknown_channel_fails_fast() {
        let bus = ChannelManager::with_defaults();
        let err = bus.publish("ghost", "t", json!(1)).await.unwrap_err();
        assert_eq!(err.as_label(), "publish_channel_not_found");
    }

    #[tokio::test]
    async fn private_channel_rejects_raw_push_but_allows_trigger() {
        let bus = ChannelManager::with_defaults();
        bus.register_channel("internal", false).await;
        let hits = Arc::new(AtomicUsize::new(0));
        // Bind without flipping visibility: the channel already exists.
        bus.register_reactor("internal", "t", counting_reactor("r", Arc::clone(&hits)))
            .await;

        let err = bus.publish("internal", "t", json!(1)).await.unwrap_err();
        assert_eq!(err.as_label(), "publish_channel_private");

        bus.trigger("internal", "t", json!(1)).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn resolve_respects_channel_authorization() {
        let bus = ChannelManager::with_defaults();
        let hits = Arc::new(AtomicUsize::new(0));
        // Reactor registered (and authorized) only for "business".
        bus.register_reactor("business", "order.created", counting_reactor("biz", Arc::clone(&hits)))
            .await;
        // Same topic bound on "system" without authorization.
        let sys = bus.register_channel("system", true).await;
        sys.bind_reactor("order.created", counting_reactor("biz", Arc::clone(&hits)))
            .await;

        let node = EventNode::new("system", "order.created", json!(1));
        let resolved = bus.resolve(&sys, &node).await;
        assert!(resolved.is_empty(), "unauthorized reactor must not resolve");

        let biz = bus.register_channel("business", true).await;
        let node = EventNode::new("business", "order.created", json!(1));
        assert_eq!(bus.resolve(&biz, &node).await.len(), 1);
    }

    #[tokio::test]
    async fn first_wins_takes_first_registered() {
        let bus = ChannelManager::with_defaults();
        let a = Arc::new(AtomicUsize::new(0));
        let b = Arc::new(AtomicUsize::new(0));
        bus.register_reactor("c", "t", counting_reactor("a", Arc::clone(&a)))
            .await;
        bus.register_reactor("c", "t", counting_reactor("b", Arc::clone(&b)))
            .await;

        let ch = bus.register_channel("c", true).await;
        let node = EventNode::new("c", "t", json!(1)).with_mechanism(ResponseMechanism::FirstWins);
        let resolved = bus.resolve(&ch, &node).await;
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].name(), "a");
    }

    #[tokio::test]
    async fn priority_order_sorts_descending_with_stable_ties() {
        let bus = ChannelManager::with_defaults();
        let ch = bus.register_channel("c", true).await;
        for (name, prio) in [("low", 1), ("high", 10), ("mid-a", 5), ("mid-b", 5)] {
            let r = EventReactor::builder(name)
                .with_priority(prio)
                .build(|_| async { Ok(()) });
            bus.authorize(name, ["c"]).await;
            ch.bind_reactor("t", r).await;
        }

        let node =
            EventNode::new("c", "t", json!(1)).with_mechanism(ResponseMechanism::PriorityOrder);
        let names: Vec<_> = bus
            .resolve(&ch, &node)
            .await
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(names, vec!["high", "mid-a", "mid-b", "low"]);
    }

    #[tokio::test]
    async fn named_selects_only_target() {
        let bus = ChannelManager::with_defaults();
        let ch = bus.register_channel("c", true).await;
        for name in ["r1", "r2"] {
            bus.register_reactor("c", "t", EventReactor::builder(name).build(|_| async { Ok(()) }))
                .await;
        }

        let node = EventNode::new("c", "t", json!(1)).for_reactor("r2");
        let resolved = bus.resolve(&ch, &node).await;
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].name(), "r2");

        let missing = EventNode::new("c", "t", json!(1)).for_reactor("ghost");
        assert!(bus.resolve(&ch, &missing).await.is_empty());
    }

    #[tokio::test]
    async fn refresh_overwrites_queued_copy() {
        let bus = ChannelManager::with_defaults();
        let ch = bus.register_channel("c", true).await;
        bus.publish_node(EventNode::new("c", "t", json!("x")).with_priority(1))
            .await
            .unwrap();
        bus.refresh(EventNode::new("c", "t", json!("x")).with_priority(5))
            .await
            .unwrap();

        assert_eq!(ch.queue_len().await, 1);
        let node = ch.pop_event(tokio::time::Instant::now()).await.unwrap();
        assert_eq!(node.priority, 5);
    }
}
