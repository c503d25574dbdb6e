//! Priority-aware event queue.
//!
//! [`EventFifo`] admits nodes in FIFO order but retrieves them by effective
//! priority, recomputed at every pop so the wait bonus stays current. Ties
//! on effective priority break toward the earliest admission (FIFO within
//! equal priority).

use std::collections::VecDeque;

use tokio::time::Instant;

use crate::events::{EventNode, PriorityWeights};

/// Ordered container of [`EventNode`]s for one channel.
///
/// Admission order is preserved internally; retrieval is
/// priority-weighted. Not synchronized — the owning
/// [`EventChannel`](crate::events::EventChannel) guards it with a lock.
pub struct EventFifo {
    nodes: VecDeque<EventNode>,
    weights: PriorityWeights,
}

impl EventFifo {
    /// Creates an empty queue with the given anti-starvation weights.
    pub fn new(weights: PriorityWeights) -> Self {
        Self {
            nodes: VecDeque::new(),
            weights,
        }
    }

    /// Admits a node at the back of the queue.
    pub fn push(&mut self, node: EventNode) {
        self.nodes.push_back(node);
    }

    /// Idempotent update: if an equal node (same `(topic, content)`) is
    /// already queued, overwrite its mutable fields in place instead of
    /// enqueueing a duplicate. Otherwise admits the node normally.
    ///
    /// Returns `true` when an existing node was updated.
    pub fn replace(&mut self, node: EventNode) -> bool {
        if let Some(existing) = self.nodes.iter_mut().find(|n| n.same_event(&node)) {
            existing.priority = node.priority;
            existing.timeout = node.timeout;
            existing.retry_times = node.retry_times;
            true
        } else {
            self.push(node);
            false
        }
    }

    /// Removes and returns the node with the highest effective priority at
    /// `now`; ties break toward the earliest `created_at`, then admission
    /// order.
    pub fn pop(&mut self, now: Instant) -> Option<EventNode> {
        let mut best: Option<(usize, f64, Instant)> = None;
        for (i, node) in self.nodes.iter().enumerate() {
            let p = node.effective_priority(&self.weights, now);
            let better = match best {
                None => true,
                Some((_, bp, bc)) => p > bp || (p == bp && node.created_at < bc),
            };
            if better {
                best = Some((i, p, node.created_at));
            }
        }
        best.and_then(|(i, _, _)| self.nodes.remove(i))
    }

    /// Removes and returns every node expired at `now`.
    ///
    /// The caller fires each node's expire callback exactly once; expired
    /// nodes are never dispatched.
    pub fn take_expired(&mut self, now: Instant) -> Vec<EventNode> {
        let mut expired = Vec::new();
        let mut kept = VecDeque::with_capacity(self.nodes.len());
        for node in self.nodes.drain(..) {
            if node.is_expired(now) {
                expired.push(node);
            } else {
                kept.push_back(node);
            }
        }
        self.nodes = kept;
        expired
    }

    /// True if an equal node is queued.
    pub fn contains(&self, node: &EventNode) -> bool {
        self.nodes.iter().any(|n| n.same_event(node))
    }

    /// Number of queued nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn fifo() -> EventFifo {
        EventFifo::new(PriorityWeights::default())
    }

    #[tokio::test(start_paused = true)]
    async fn pop_selects_highest_effective_priority() {
        let mut q = fifo();
        q.push(EventNode::new("c", "low", json!(1)).with_priority(1));
        q.push(EventNode::new("c", "high", json!(2)).with_priority(10));

        let first = q.pop(Instant::now()).unwrap();
        assert_eq!(first.topic, "high");
        let second = q.pop(Instant::now()).unwrap();
        assert_eq!(second.topic, "low");
        assert!(q.pop(Instant::now()).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn equal_priority_pops_fifo() {
        let mut q = fifo();
        q.push(EventNode::new("c", "a", json!(1)).with_priority(5));
        tokio::time::advance(Duration::from_millis(1)).await;
        q.push(EventNode::new("c", "b", json!(2)).with_priority(5));

        // The older node carries a marginally larger wait bonus, and the
        // created_at tiebreak points the same way.
        assert_eq!(q.pop(Instant::now()).unwrap().topic, "a");
        assert_eq!(q.pop(Instant::now()).unwrap().topic, "b");
    }

    #[tokio::test(start_paused = true)]
    async fn replace_updates_in_place() {
        let mut q = fifo();
        q.push(EventNode::new("c", "t", json!("c")).with_priority(1));
        let updated = q.replace(
            EventNode::new("c", "t", json!("c"))
                .with_priority(5)
                .with_retries(3),
        );

        assert!(updated);
        assert_eq!(q.len(), 1);
        let node = q.pop(Instant::now()).unwrap();
        assert_eq!(node.priority, 5);
        assert_eq!(node.retry_times, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn replace_of_absent_node_admits_it() {
        let mut q = fifo();
        assert!(!q.replace(EventNode::new("c", "t", json!(1))));
        assert_eq!(q.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn take_expired_separates_dead_nodes() {
        let mut q = fifo();
        q.push(EventNode::new("c", "mortal", json!(1)).with_timeout(Duration::from_secs(5)));
        q.push(EventNode::new("c", "immortal", json!(2)));

        tokio::time::advance(Duration::from_secs(6)).await;
        let expired = q.take_expired(Instant::now());
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].topic, "mortal");
        assert_eq!(q.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_low_priority_overtakes_fresh_high_priority() {
        // Weights tuned so the capped bonus exceeds the priority gap: at
        // the 300s cap the bonus is 300 * 2 * 2.0 = 1200 > 990.
        let mut q = EventFifo::new(PriorityWeights {
            max_wait: Duration::from_secs(300),
            wait_weight: 2.0,
        });

        q.push(EventNode::new("orders", "order.created", json!({"id": 1})).with_priority(10));
        q.push(EventNode::new("orders", "order.created", json!({"id": 2})).with_priority(10));

        tokio::time::advance(Duration::from_secs(301)).await;
        q.push(EventNode::new("orders", "order.created", json!({"id": 3})).with_priority(1000));

        let now = Instant::now();
        assert_eq!(q.pop(now).unwrap().content["id"], 1);
        assert_eq!(q.pop(now).unwrap().content["id"], 2);
        assert_eq!(q.pop(now).unwrap().content["id"], 3);
    }
}
