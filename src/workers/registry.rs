//! Worker registry: name → worker lookup table.
//!
//! The registry owns worker identity and lookup; the scheduler owns the
//! right to invoke `execute()`. All operations are thread-safe; concurrent
//! `register`/`get` never observe a partially-constructed entry because
//! entries are inserted fully built under a write lock.
//!
//! ## Duplicate names
//! [`RegisterMode::Strict`] rejects a duplicate registration with
//! [`RegistryError::DuplicateWorker`]. [`RegisterMode::Permissive`]
//! auto-suffixes the new entry (`name#2`, `name#3`, ...) and logs a
//! warning — this silently changes the worker's identity, which is why the
//! permissive behavior is opt-in.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::RegistryError;
use crate::workers::{WorkerProps, WorkerRef};

/// Duplicate-name handling for worker registration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RegisterMode {
    /// Reject duplicate names with an error (default).
    #[default]
    Strict,
    /// Auto-suffix duplicate names (`name#2`, `name#3`, ...).
    Permissive,
}

struct Entry {
    worker: WorkerRef,
    props: WorkerProps,
    created: bool,
}

/// Thread-safe mapping from worker name to worker instance and descriptor.
pub struct WorkerRegistry {
    entries: RwLock<HashMap<String, Entry>>,
    mode: RegisterMode,
}

impl WorkerRegistry {
    /// Creates an empty registry with the given duplicate-name mode.
    pub fn new(mode: RegisterMode) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            mode,
        }
    }

    /// Registers a worker under the name carried by `props`.
    ///
    /// Returns the effective name — identical to `props.name()` except in
    /// permissive mode when a suffix was applied.
    pub async fn register(
        &self,
        worker: WorkerRef,
        props: WorkerProps,
    ) -> Result<String, RegistryError> {
        let mut entries = self.entries.write().await;
        let requested = props.name().to_string();

        let name = if entries.contains_key(&requested) {
            match self.mode {
                RegisterMode::Strict => {
                    return Err(RegistryError::DuplicateWorker { name: requested });
                }
                RegisterMode::Permissive => {
                    let mut n = 2usize;
                    let mut candidate = format!("{requested}#{n}");
                    while entries.contains_key(&candidate) {
                        n += 1;
                        candidate = format!("{requested}#{n}");
                    }
                    warn!(
                        worker = %requested,
                        effective = %candidate,
                        "duplicate worker name, auto-suffixed"
                    );
                    candidate
                }
            }
        } else {
            requested
        };

        let props = if props.name() == name {
            props
        } else {
            props.renamed(name.clone())
        };
        entries.insert(
            name.clone(),
            Entry {
                worker,
                props,
                created: false,
            },
        );
        debug!(worker = %name, "worker registered");
        Ok(name)
    }

    /// Claims the worker's first dispatch.
    ///
    /// Returns `true` exactly once per registration; re-registering a name
    /// resets the flag, so a fresh instance gets its own first dispatch.
    pub async fn mark_created(&self, name: &str) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get_mut(name) {
            Some(e) if !e.created => {
                e.created = true;
                true
            }
            _ => false,
        }
    }

    /// Looks up a worker and its descriptor by name.
    pub async fn get(&self, name: &str) -> Option<(WorkerRef, WorkerProps)> {
        let entries = self.entries.read().await;
        entries
            .get(name)
            .map(|e| (e.worker.clone(), e.props.clone()))
    }

    /// Returns all registered workers with their descriptors, sorted by
    /// name for deterministic iteration.
    pub async fn get_all(&self) -> Vec<(WorkerRef, WorkerProps)> {
        let entries = self.entries.read().await;
        let mut all: Vec<_> = entries
            .values()
            .map(|e| (e.worker.clone(), e.props.clone()))
            .collect();
        all.sort_by(|a, b| a.1.name().cmp(b.1.name()));
        all
    }

    /// Returns registered worker names, sorted.
    pub async fn names(&self) -> Vec<String> {
        let entries = self.entries.read().await;
        let mut names: Vec<String> = entries.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Removes a worker, returning its handle and descriptor.
    ///
    /// The caller is responsible for invoking the worker's `on_destroy`.
    pub async fn unregister(&self, name: &str) -> Option<(WorkerRef, WorkerProps)> {
        let mut entries = self.entries.write().await;
        entries.remove(name).map(|e| {
            debug!(worker = %name, "worker unregistered");
            (e.worker, e.props)
        })
    }

    /// Number of registered workers.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True if no workers are registered.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for WorkerRegistry {
    fn default() -> Self {
        Self::new(RegisterMode::Strict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workers::{WorkerFn, WorkerResult};

    fn noop(name: &'static str) -> WorkerRef {
        WorkerFn::arc(name, move |_ctx| async move {
            Ok(WorkerResult::ok(name, "noop", serde_json::json!(null)))
        })
    }

    #[tokio::test]
    async fn strict_mode_rejects_duplicates() {
        let reg = WorkerRegistry::new(RegisterMode::Strict);
        reg.register(noop("a"), WorkerProps::new("a")).await.unwrap();
        let err = reg
            .register(noop("a"), WorkerProps::new("a"))
            .await
            .unwrap_err();
        assert_eq!(err.as_label(), "registry_duplicate_worker");
        assert_eq!(reg.len().await, 1);
    }

    #[tokio::test]
    async fn permissive_mode_suffixes_duplicates() {
        let reg = WorkerRegistry::new(RegisterMode::Permissive);
        reg.register(noop("a"), WorkerProps::new("a")).await.unwrap();
        let second = reg.register(noop("a"), WorkerProps::new("a")).await.unwrap();
        let third = reg.register(noop("a"), WorkerProps::new("a")).await.unwrap();
        assert_eq!(second, "a#2");
        assert_eq!(third, "a#3");

        // The suffixed descriptor carries the effective name.
        let (_, props) = reg.get("a#2").await.unwrap();
        assert_eq!(props.name(), "a#2");
    }

    #[tokio::test]
    async fn unregister_removes_entry() {
        let reg = WorkerRegistry::default();
        reg.register(noop("a"), WorkerProps::new("a")).await.unwrap();
        assert!(reg.unregister("a").await.is_some());
        assert!(reg.get("a").await.is_none());
        assert!(reg.unregister("a").await.is_none());
    }

    #[tokio::test]
    async fn mark_created_fires_once_per_registration() {
        let reg = WorkerRegistry::default();
        reg.register(noop("a"), WorkerProps::new("a")).await.unwrap();
        assert!(reg.mark_created("a").await);
        assert!(!reg.mark_created("a").await);

        // A fresh registration under the same name starts over.
        reg.unregister("a").await;
        assert!(!reg.mark_created("a").await);
        reg.register(noop("a"), WorkerProps::new("a")).await.unwrap();
        assert!(reg.mark_created("a").await);
    }

    #[tokio::test]
    async fn get_all_is_sorted_by_name() {
        let reg = WorkerRegistry::default();
        reg.register(noop("b"), WorkerProps::new("b")).await.unwrap();
        reg.register(noop("a"), WorkerProps::new("a")).await.unwrap();
        let names: Vec<_> = reg
            .get_all()
            .await
            .into_iter()
            .map(|(_, p)| p.name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
