use crate::entry::WeakEntry;
use crate::listener::{RemovalCause, RemovalListener};
use crate::metrics::{Metrics, MetricsSnapshot};

use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use parking_lot::Mutex;

/// The map plus the first-insertion order of its keys, guarded as one unit.
struct OrderedInner<K, V, H> {
  map: HashMap<K, WeakEntry<V>, H>,
  order: Vec<K>,
}

/// The insertion-ordered sibling of [`WeakValueCache`].
///
/// Same contract: values are held weakly, dead mappings are purged on
/// access, and every removal is reported to the listener. In addition, keys
/// remember the order of their first insertion. Re-inserting an existing
/// key does not move it, and `evict_all` visits entries in that order,
/// which makes full-eviction teardown deterministic.
///
/// [`WeakValueCache`]: crate::cache::WeakValueCache
pub struct OrderedWeakValueCache<K, V, H = ahash::RandomState> {
  inner: Mutex<OrderedInner<K, V, H>>,
  listener: Option<Arc<dyn RemovalListener<K, V>>>,
  metrics: Metrics,
}

impl<K, V, H> fmt::Debug for OrderedWeakValueCache<K, V, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("OrderedWeakValueCache")
      .field("has_listener", &self.listener.is_some())
      .field("metrics", &self.metrics.snapshot())
      .finish_non_exhaustive()
  }
}

impl<K, V> OrderedWeakValueCache<K, V>
where
  K: Eq + Hash + Clone,
{
  /// Creates an empty cache with the default hasher and no listener.
  pub fn new() -> Self {
    crate::builder::WeakCacheBuilder::default().build_ordered()
  }
}

impl<K, V> Default for OrderedWeakValueCache<K, V>
where
  K: Eq + Hash + Clone,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<K, V, H> OrderedWeakValueCache<K, V, H>
where
  K: Eq + Hash + Clone,
  H: BuildHasher,
{
  pub(crate) fn with_parts(
    initial_capacity: usize,
    hasher: H,
    listener: Option<Arc<dyn RemovalListener<K, V>>>,
  ) -> Self {
    Self {
      inner: Mutex::new(OrderedInner {
        map: HashMap::with_capacity_and_hasher(initial_capacity, hasher),
        order: Vec::with_capacity(initial_capacity),
      }),
      listener,
      metrics: Metrics::new(),
    }
  }

  /// Retrieves the value for `key` if the mapping exists and the value is
  /// still alive. Never fires the listener for the lookup itself.
  pub fn get(&self, key: &K) -> Option<Arc<V>> {
    let (purged, value) = {
      let mut guard = self.inner.lock();
      let purged = Self::sweep(&mut guard);
      let value = guard.map.get(key).and_then(|entry| entry.upgrade());
      (purged, value)
    };

    if value.is_some() {
      self.metrics.hits.fetch_add(1, Ordering::Relaxed);
    } else {
      self.metrics.misses.fetch_add(1, Ordering::Relaxed);
    }

    self.notify_collected(purged);
    value
  }

  /// Reports whether a live mapping exists for `key`, purging dead entries
  /// first.
  pub fn contains_key(&self, key: &K) -> bool {
    let (purged, present) = {
      let mut guard = self.inner.lock();
      let purged = Self::sweep(&mut guard);
      (purged, guard.map.contains_key(key))
    };

    self.notify_collected(purged);
    present
  }

  /// Inserts a mapping from `key` to the value behind the caller's `Arc`.
  ///
  /// A key inserted for the first time goes to the back of the insertion
  /// order; re-inserting an existing key keeps its original position.
  /// Returns the previously mapped value if it was still alive, firing
  /// [`RemovalCause::Replaced`] for a displaced live mapping.
  pub fn insert(&self, key: K, value: &Arc<V>) -> Option<Arc<V>> {
    let (purged, previous) = {
      let mut guard = self.inner.lock();
      let mut purged = Self::sweep(&mut guard);
      let old_entry = guard.map.insert(key.clone(), WeakEntry::new(value));

      let previous = match old_entry {
        Some(entry) => {
          // A live predecessor keeps its slot in the order list. One that
          // died between the sweep and this insert is a collected entry,
          // not a replacement, and the key re-enters as a fresh insertion
          // at the back.
          let live = entry.upgrade();
          if live.is_none() {
            purged.push(key.clone());
            guard.order.retain(|k| k != &key);
            guard.order.push(key.clone());
          }
          live
        }
        None => {
          guard.order.push(key.clone());
          None
        }
      };
      (purged, previous)
    };

    self.metrics.inserts.fetch_add(1, Ordering::Relaxed);
    self.notify_collected(purged);

    if let Some(old) = &previous {
      self.metrics.replacements.fetch_add(1, Ordering::Relaxed);
      self.notify(
        RemovalCause::Replaced,
        key,
        Some(old.clone()),
        Some(value.clone()),
      );
    }
    previous
  }

  /// Removes the mapping for `key`, returning its value if it was still
  /// alive. Fires [`RemovalCause::Explicit`] when a mapping existed.
  pub fn remove(&self, key: &K) -> Option<Arc<V>> {
    let (purged, removed) = {
      let mut guard = self.inner.lock();
      let purged = Self::sweep(&mut guard);
      let removed = guard
        .map
        .remove_entry(key)
        .map(|(key, entry)| (key, entry.upgrade()));
      if removed.is_some() {
        guard.order.retain(|k| k != key);
      }
      (purged, removed)
    };

    self.notify_collected(purged);

    match removed {
      Some((key, old)) => {
        self.metrics.removals.fetch_add(1, Ordering::Relaxed);
        self.notify(RemovalCause::Explicit, key, old.clone(), None);
        old
      }
      None => None,
    }
  }

  /// Removes every mapping in first-insertion order, firing the removal
  /// listener once per entry with [`RemovalCause::Cleared`].
  ///
  /// Safe to call concurrently with any other operation on this instance.
  pub fn evict_all(&self) {
    let (purged, drained) = {
      let mut guard = self.inner.lock();
      let purged = Self::sweep(&mut guard);
      let order: Vec<K> = guard.order.drain(..).collect();
      let drained: Vec<(K, Option<Arc<V>>)> = order
        .into_iter()
        .filter_map(|key| {
          let entry = guard.map.remove(&key)?;
          Some((key, entry.upgrade()))
        })
        .collect();
      debug_assert!(guard.map.is_empty());
      (purged, drained)
    };

    self.notify_collected(purged);

    self
      .metrics
      .cleared
      .fetch_add(drained.len() as u64, Ordering::Relaxed);
    for (key, old) in drained {
      self.notify(RemovalCause::Cleared, key, old, None);
    }
  }

  /// Returns the keys of all live mappings in first-insertion order.
  pub fn keys(&self) -> Vec<K> {
    let (purged, keys) = {
      let mut guard = self.inner.lock();
      let purged = Self::sweep(&mut guard);
      (purged, guard.order.clone())
    };

    self.notify_collected(purged);
    keys
  }

  /// Returns the number of live mappings, purging dead entries first.
  pub fn len(&self) -> usize {
    let (purged, len) = {
      let mut guard = self.inner.lock();
      let purged = Self::sweep(&mut guard);
      (purged, guard.map.len())
    };

    self.notify_collected(purged);
    len
  }

  /// Returns `true` when no live mapping remains.
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Creates a point-in-time snapshot of the cache's metrics.
  pub fn metrics(&self) -> MetricsSnapshot {
    self.metrics.snapshot()
  }

  /// Unlinks every entry whose value has been dropped, returning their keys
  /// in first-insertion order. Runs under the lock; notifications are the
  /// caller's job once the lock is released.
  fn sweep(inner: &mut OrderedInner<K, V, H>) -> Vec<K> {
    // Every mapped key appears in the order list, so scanning it covers the
    // whole map and yields the dead keys in insertion order.
    let OrderedInner { map, order } = inner;
    let mut dead = Vec::new();
    order.retain(|key| {
      if map.get(key).map_or(false, |entry| entry.is_collected()) {
        map.remove(key);
        dead.push(key.clone());
        false
      } else {
        true
      }
    });
    dead
  }

  fn notify_collected(&self, dead: Vec<K>) {
    if dead.is_empty() {
      return;
    }
    self
      .metrics
      .collected
      .fetch_add(dead.len() as u64, Ordering::Relaxed);
    for key in dead {
      self.notify(RemovalCause::Collected, key, None, None);
    }
  }

  #[inline]
  fn notify(&self, cause: RemovalCause, key: K, old: Option<Arc<V>>, new: Option<Arc<V>>) {
    if let Some(listener) = &self.listener {
      listener.on_removal(cause, key, old, new);
    }
  }
}
