//! Event node and anti-starvation priority computation.
//!
//! An [`EventNode`] is a queued, topic-addressed unit of asynchronous work.
//! Two nodes with identical `(topic, content)` are the same logical event
//! regardless of their other fields — that pair defines equality and is
//! what [`EventFifo::replace`](crate::events::EventFifo::replace) keys on.
//!
//! ## Effective priority
//! Retrieval order is governed by an effective priority that grows with
//! wait time:
//!
//! ```text
//! wait   = clamp(now - created_at, 0, max_wait)
//! bonus  = wait * (1 + wait / max_wait) * wait_weight
//! effective = priority + bonus
//! ```
//!
//! The bonus is super-linear in wait time and capped at `max_wait`, so a
//! low-priority event eventually out-ranks fresh high-priority arrivals.
//! This bounds worst-case wait regardless of base priority.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

/// Callback fired exactly once when an expired node is removed.
pub type ExpireCallback = Arc<dyn Fn(&EventNode) + Send + Sync>;

/// How reactors are selected for an event within its channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResponseMechanism {
    /// Only the first registered reactor executes.
    FirstWins,
    /// All matching reactors execute, in descending reactor priority;
    /// registration order breaks ties.
    PriorityOrder,
    /// All matching reactors execute, concurrently and independently.
    #[default]
    Broadcast,
    /// Only the reactor named by the node's `reactor_name` executes; the
    /// event is unroutable when that reactor is absent.
    Named,
}

/// Anti-starvation weights used when computing effective priority.
#[derive(Clone, Copy, Debug)]
pub struct PriorityWeights {
    /// Cap on the wait time that earns a bonus.
    pub max_wait: Duration,
    /// Multiplier applied to the (super-linear) wait term.
    pub wait_weight: f64,
}

impl Default for PriorityWeights {
    /// 300s cap, 0.3 weight.
    fn default() -> Self {
        Self {
            max_wait: Duration::from_secs(300),
            wait_weight: 0.3,
        }
    }
}

impl PriorityWeights {
    /// Computes the wait bonus for the given wait duration.
    pub fn wait_bonus(&self, wait: Duration) -> f64 {
        let max = self.max_wait.as_secs_f64();
        if max <= 0.0 {
            return 0.0;
        }
        let w = wait.as_secs_f64().clamp(0.0, max);
        w * (1.0 + w / max) * self.wait_weight
    }
}

/// Queued, topic-addressed unit of asynchronous work.
#[derive(Clone)]
pub struct EventNode {
    /// Topic the event is addressed to.
    pub topic: String,
    /// Arbitrary payload; part of the node's logical identity.
    pub content: Value,
    /// Channel the event belongs to.
    pub channel: String,
    /// Base priority; higher dequeues first, subject to the wait bonus.
    pub priority: i64,
    /// Admission time, used for the wait bonus and expiry.
    pub created_at: Instant,
    /// Optional lifetime; expired nodes are never dispatched.
    pub timeout: Option<Duration>,
    /// Re-delivery budget when no reactor matches at dispatch time.
    pub retry_times: u32,
    /// Reactor selection mechanism.
    pub mechanism: ResponseMechanism,
    /// Target reactor for [`ResponseMechanism::Named`].
    pub reactor_name: Option<String>,
    /// Fired exactly once if the node expires before dispatch.
    pub expire_callback: Option<ExpireCallback>,
}

impl EventNode {
    /// Creates a node with default priority, no timeout, and broadcast
    /// delivery.
    pub fn new(channel: impl Into<String>, topic: impl Into<String>, content: Value) -> Self {
        Self {
            topic: topic.into(),
            content,
            channel: channel.into(),
            priority: 0,
            created_at: Instant::now(),
            timeout: None,
            retry_times: 0,
            mechanism: ResponseMechanism::default(),
            reactor_name: None,
            expire_callback: None,
        }
    }

    /// Sets the base priority.
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the node's lifetime.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the no-reactor re-delivery budget.
    pub fn with_retries(mut self, retry_times: u32) -> Self {
        self.retry_times = retry_times;
        self
    }

    /// Sets the reactor selection mechanism.
    pub fn with_mechanism(mut self, mechanism: ResponseMechanism) -> Self {
        self.mechanism = mechanism;
        self
    }

    /// Targets a single named reactor ([`ResponseMechanism::Named`]).
    pub fn for_reactor(mut self, reactor: impl Into<String>) -> Self {
        self.reactor_name = Some(reactor.into());
        self.mechanism = ResponseMechanism::Named;
        self
    }

    /// Registers a callback fired exactly once on expiry.
    pub fn on_expire(mut self, cb: impl Fn(&EventNode) + Send + Sync + 'static) -> Self {
        self.expire_callback = Some(Arc::new(cb));
        self
    }

    /// True when this node and `other` are the same logical event.
    pub fn same_event(&self, other: &EventNode) -> bool {
        self.topic == other.topic && self.content == other.content
    }

    /// Effective priority at `now`: base priority plus the wait bonus.
    ///
    /// Recomputed at every retrieval — never cached, since it is
    /// time-dependent.
    pub fn effective_priority(&self, weights: &PriorityWeights, now: Instant) -> f64 {
        let wait = now.saturating_duration_since(self.created_at);
        self.priority as f64 + weights.wait_bonus(wait)
    }

    /// True iff the node has a lifetime and it has elapsed at `now`.
    pub fn is_expired(&self, now: Instant) -> bool {
        match self.timeout {
            Some(t) => t > Duration::ZERO && now.saturating_duration_since(self.created_at) > t,
            None => false,
        }
    }
}

/// Equality over `(topic, content)` only — the logical-event identity.
impl PartialEq for EventNode {
    fn eq(&self, other: &Self) -> bool {
        self.same_event(other)
    }
}

impl fmt::Debug for EventNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventNode")
            .field("topic", &self.topic)
            .field("channel", &self.channel)
            .field("priority", &self.priority)
            .field("retry_times", &self.retry_times)
            .field("mechanism", &self.mechanism)
            .field("reactor_name", &self.reactor_name)
            .finish_non_exhaustive()
    }
}
