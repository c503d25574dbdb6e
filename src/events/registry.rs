//! Channel registry: get-or-create table of named channels.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::events::{EventChannel, PriorityWeights};

/// Thread-safe name → channel table with lazy creation.
pub struct ChannelRegistry {
    channels: RwLock<HashMap<String, Arc<EventChannel>>>,
    weights: PriorityWeights,
}

impl ChannelRegistry {
    /// Creates an empty registry; channels it creates inherit `weights`.
    pub fn new(weights: PriorityWeights) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            weights,
        }
    }

    /// Returns the named channel, creating it with the given visibility if
    /// absent. Visibility of an existing channel is never changed.
    pub async fn get_or_create(&self, name: &str, public: bool) -> Arc<EventChannel> {
        {
            let channels = self.channels.read().await;
            if let Some(ch) = channels.get(name) {
                return Arc::clone(ch);
            }
        }
        let mut channels = self.channels.write().await;
        // Re-check under the write lock; another task may have created it.
        if let Some(ch) = channels.get(name) {
            return Arc::clone(ch);
        }
        let ch = Arc::new(EventChannel::new(name, public, self.weights));
        channels.insert(name.to_string(), Arc::clone(&ch));
        debug!(channel = %name, public, "channel created");
        ch
    }

    /// Looks up an existing channel.
    pub async fn get(&self, name: &str) -> Option<Arc<EventChannel>> {
        self.channels.read().await.get(name).cloned()
    }

    /// Returns every channel. Iteration order is unspecified.
    pub async fn all(&self) -> Vec<Arc<EventChannel>> {
        self.channels.read().await.values().cloned().collect()
    }

    /// Returns registered channel names, sorted.
    pub async fn names(&self) -> Vec<String> {
        let channels = self.channels.read().await;
        let mut names: Vec<String> = channels.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered channels.
    pub async fn count(&self) -> usize {
        self.channels.read().await.len()
    }
}
