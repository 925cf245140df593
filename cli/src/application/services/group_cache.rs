//! Application service: compute-once lookups keyed by group.
//!
//! The first lookup of a group runs the backing computation; every caller
//! that arrives while it is in flight waits for it and receives the same
//! outcome. The map lock is only held to fetch or insert a slot, never
//! across the computation itself.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chefboot_common::{CachePolicy, FailurePolicy, Group, Retention};
use tokio::sync::{Mutex, OnceCell};

use crate::domain::error::LookupError;

type Slot<V> = Arc<OnceCell<Result<V, LookupError>>>;

struct Entries<V> {
    slots: HashMap<Group, Slot<V>>,
    /// Insertion order, oldest first. Used for capacity eviction.
    order: VecDeque<Group>,
}

impl<V> Default for Entries<V> {
    fn default() -> Self {
        Self {
            slots: HashMap::new(),
            order: VecDeque::new(),
        }
    }
}

/// Memoizing map from [`Group`] to `V`, filled on demand by `compute`.
pub struct GroupCache<V, F> {
    compute: F,
    policy: CachePolicy,
    entries: Mutex<Entries<V>>,
}

impl<V, F, Fut> GroupCache<V, F>
where
    V: Clone,
    F: Fn(Group) -> Fut,
    Fut: Future<Output = Result<V>>,
{
    /// Cache with the default policy: unbounded, failures retried.
    pub fn new(compute: F) -> Self {
        Self::with_policy(compute, CachePolicy::default())
    }

    pub fn with_policy(compute: F, policy: CachePolicy) -> Self {
        Self {
            compute,
            policy,
            entries: Mutex::new(Entries::default()),
        }
    }

    /// Value for `group`, computing it if no computation has completed yet.
    ///
    /// If the caller driving the computation is dropped, one of the waiting
    /// callers runs it instead.
    ///
    /// # Errors
    ///
    /// Returns the [`LookupError`] produced by the computation. Under
    /// [`FailurePolicy::Retry`] the failed entry is dropped once observed, so
    /// a later lookup computes again.
    pub async fn lookup(&self, group: &Group) -> Result<V, LookupError> {
        let slot = self.slot(group).await;

        if let Some(outcome) = slot.get() {
            tracing::debug!(%group, "group cache hit");
            return outcome.clone();
        }

        let outcome = slot
            .get_or_init(|| async {
                tracing::debug!(%group, "computing group cache entry");
                (self.compute)(group.clone()).await.map_err(|cause| {
                    let err = LookupError::new(group, &cause);
                    tracing::warn!(%group, error = %err.message, "group lookup failed");
                    err
                })
            })
            .await
            .clone();

        if outcome.is_err() && self.policy.failures == FailurePolicy::Retry {
            self.forget(group, &slot).await;
        } else if matches!(self.policy.retention, Retention::Capacity(_)) {
            self.trim(&mut *self.entries.lock().await);
        }
        outcome
    }

    /// Number of groups with a slot, including in-flight computations.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.slots.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Whether `group` has a completed value or failure on record.
    pub async fn contains(&self, group: &Group) -> bool {
        self.entries
            .lock()
            .await
            .slots
            .get(group)
            .is_some_and(|slot| slot.initialized())
    }

    /// Drop the entry for `group`. Returns `true` if there was one.
    ///
    /// Callers already waiting on the dropped entry still receive its outcome.
    pub async fn invalidate(&self, group: &Group) -> bool {
        let mut entries = self.entries.lock().await;
        entries.order.retain(|g| g != group);
        entries.slots.remove(group).is_some()
    }

    async fn slot(&self, group: &Group) -> Slot<V> {
        let mut entries = self.entries.lock().await;
        if let Some(slot) = entries.slots.get(group) {
            return Arc::clone(slot);
        }

        let slot: Slot<V> = Arc::new(OnceCell::new());
        entries.slots.insert(group.clone(), Arc::clone(&slot));
        entries.order.push_back(group.clone());

        self.trim(&mut entries);
        slot
    }

    /// Evict completed entries, oldest first, until within capacity.
    /// In-flight entries are never evicted, so the map may exceed capacity
    /// until one of them completes.
    fn trim(&self, entries: &mut Entries<V>) {
        let Retention::Capacity(capacity) = self.policy.retention else {
            return;
        };
        let Entries { slots, order } = entries;
        while slots.len() > capacity.get() {
            let completed = order
                .iter()
                .position(|g| slots.get(g).is_some_and(|slot| slot.initialized()));
            let Some(oldest) = completed.and_then(|at| order.remove(at)) else {
                break;
            };
            slots.remove(&oldest);
            tracing::debug!(group = %oldest, "evicted group cache entry");
        }
    }

    /// Remove `group` only if it still maps to `slot`; a newer computation
    /// started after this one failed must be left alone.
    async fn forget(&self, group: &Group, slot: &Slot<V>) {
        let mut entries = self.entries.lock().await;
        if entries
            .slots
            .get(group)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
        {
            entries.slots.remove(group);
            entries.order.retain(|g| g != group);
        }
    }
}

/// Run `lookup`, failing with a descriptive error once `limit` elapses.
///
/// # Errors
///
/// Returns the lookup's own error, or a timeout error.
pub async fn with_timeout<T>(
    limit: Duration,
    what: &str,
    lookup: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, lookup).await {
        Ok(outcome) => outcome,
        Err(_) => anyhow::bail!("{what} timed out after {limit:?}"),
    }
}
