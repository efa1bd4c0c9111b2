use crate::entry::WeakEntry;
use crate::listener::{RemovalCause, RemovalListener};
use crate::metrics::{Metrics, MetricsSnapshot};

use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use parking_lot::Mutex;

/// A thread-safe cache that maps keys to `Arc`'d values without keeping the
/// values alive.
///
/// The cache holds only weak handles. A value stays retrievable for exactly
/// as long as some caller outside the cache holds a strong `Arc<V>` to it;
/// once the last one is dropped, the mapping is dead and is purged (with a
/// [`RemovalCause::Collected`] notification) by the next public operation on
/// this instance.
///
/// Iteration order is unspecified. Use [`OrderedWeakValueCache`] when
/// `evict_all` must visit entries in insertion order.
///
/// [`OrderedWeakValueCache`]: crate::ordered::OrderedWeakValueCache
pub struct WeakValueCache<K, V, H = ahash::RandomState> {
  map: Mutex<HashMap<K, WeakEntry<V>, H>>,
  listener: Option<Arc<dyn RemovalListener<K, V>>>,
  metrics: Metrics,
}

impl<K, V, H> fmt::Debug for WeakValueCache<K, V, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("WeakValueCache")
      .field("has_listener", &self.listener.is_some())
      .field("metrics", &self.metrics.snapshot())
      .finish_non_exhaustive()
  }
}

impl<K, V> WeakValueCache<K, V>
where
  K: Eq + Hash + Clone,
{
  /// Creates an empty cache with the default hasher and no listener.
  pub fn new() -> Self {
    crate::builder::WeakCacheBuilder::default().build()
  }
}

impl<K, V> Default for WeakValueCache<K, V>
where
  K: Eq + Hash + Clone,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<K, V, H> WeakValueCache<K, V, H>
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
      map: Mutex::new(HashMap::with_capacity_and_hasher(initial_capacity, hasher)),
      listener,
      metrics: Metrics::new(),
    }
  }

  /// Retrieves the value for `key` if the mapping exists and the value is
  /// still alive.
  ///
  /// Read-only with respect to the key being queried: the removal listener
  /// never fires for the lookup itself, only for dead entries purged on the
  /// way in.
  pub fn get(&self, key: &K) -> Option<Arc<V>> {
    let (purged, value) = {
      let mut guard = self.map.lock();
      let purged = Self::sweep(&mut guard);
      let value = guard.get(key).and_then(|entry| entry.upgrade());
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

  /// Reports whether a live mapping exists for `key`.
  ///
  /// A mapping whose value has already been dropped reports `false`: dead
  /// entries are purged before the check.
  pub fn contains_key(&self, key: &K) -> bool {
    let (purged, present) = {
      let mut guard = self.map.lock();
      let purged = Self::sweep(&mut guard);
      (purged, guard.contains_key(key))
    };

    self.notify_collected(purged);
    present
  }

  /// Inserts a mapping from `key` to the value behind the caller's `Arc`.
  ///
  /// The cache takes no ownership share: the caller (or someone else) must
  /// keep holding a strong `Arc<V>` for the mapping to stay alive.
  ///
  /// Returns the previously mapped value if one existed and was still alive.
  /// A dead predecessor is reported as `None`, matching its purge-first
  /// treatment everywhere else. Displacing a live mapping fires the removal
  /// listener with [`RemovalCause::Replaced`] after the lock is released.
  pub fn insert(&self, key: K, value: &Arc<V>) -> Option<Arc<V>> {
    let (purged, previous) = {
      let mut guard = self.map.lock();
      let mut purged = Self::sweep(&mut guard);
      let old_entry = guard.insert(key.clone(), WeakEntry::new(value));

      // An entry that died between the sweep and this insert is still a
      // collected entry, not a replacement.
      let previous = match old_entry {
        Some(entry) => {
          let live = entry.upgrade();
          if live.is_none() {
            purged.push(key.clone());
          }
          live
        }
        None => None,
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
  /// alive.
  ///
  /// Fires the removal listener with [`RemovalCause::Explicit`] when a
  /// mapping existed, carrying the value if it was still resolvable.
  pub fn remove(&self, key: &K) -> Option<Arc<V>> {
    let (purged, removed) = {
      let mut guard = self.map.lock();
      let purged = Self::sweep(&mut guard);
      let removed = guard
        .remove_entry(key)
        .map(|(key, entry)| (key, entry.upgrade()));
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

  /// Removes every mapping, firing the removal listener once per entry with
  /// [`RemovalCause::Cleared`].
  ///
  /// Safe to call concurrently with any other operation on this instance.
  /// The notification carries the entry's value when it is still resolvable
  /// at removal time.
  pub fn evict_all(&self) {
    let (purged, drained) = {
      let mut guard = self.map.lock();
      let purged = Self::sweep(&mut guard);
      let drained: Vec<(K, Option<Arc<V>>)> = guard
        .drain()
        .map(|(key, entry)| (key, entry.upgrade()))
        .collect();
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

  /// Returns the number of live mappings, purging dead entries first.
  pub fn len(&self) -> usize {
    let (purged, len) = {
      let mut guard = self.map.lock();
      let purged = Self::sweep(&mut guard);
      (purged, guard.len())
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

  /// Unlinks every entry whose value has been dropped, returning their keys.
  ///
  /// Runs under the map lock; notifications for the returned keys must be
  /// fired by the caller after releasing it.
  fn sweep(map: &mut HashMap<K, WeakEntry<V>, H>) -> Vec<K> {
    let mut dead = Vec::new();
    map.retain(|key, entry| {
      if entry.is_collected() {
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
