use crate::cache::WeakValueCache;
use crate::listener::RemovalListener;
use crate::ordered::OrderedWeakValueCache;

use core::fmt;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

/// A builder for creating [`WeakValueCache`] and [`OrderedWeakValueCache`]
/// instances.
///
/// Construction cannot fail: there is no capacity or shard configuration to
/// get wrong, so `build`/`build_ordered` return the cache directly.
pub struct WeakCacheBuilder<K, V, H = ahash::RandomState> {
  initial_capacity: usize,
  hasher: H,
  listener: Option<Arc<dyn RemovalListener<K, V>>>,
}

// Manual Debug implementation for WeakCacheBuilder.
impl<K, V, H> fmt::Debug for WeakCacheBuilder<K, V, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("WeakCacheBuilder")
      .field("initial_capacity", &self.initial_capacity)
      .field("has_listener", &self.listener.is_some())
      .finish_non_exhaustive()
  }
}

impl<K, V> WeakCacheBuilder<K, V> {
  /// Creates a builder with the default hasher, no pre-allocated capacity
  /// and no listener.
  pub fn new() -> Self {
    Self::default()
  }
}

impl<K, V> Default for WeakCacheBuilder<K, V> {
  fn default() -> Self {
    Self {
      initial_capacity: 0,
      hasher: ahash::RandomState::default(),
      listener: None,
    }
  }
}

impl<K, V, H> WeakCacheBuilder<K, V, H> {
  /// Pre-allocates space for at least `capacity` mappings.
  ///
  /// This is a sizing hint only; the cache never evicts on capacity.
  pub fn initial_capacity(mut self, capacity: usize) -> Self {
    self.initial_capacity = capacity;
    self
  }

  /// Replaces the hash state used by the cache's map.
  pub fn hasher<H2>(self, hasher: H2) -> WeakCacheBuilder<K, V, H2> {
    WeakCacheBuilder {
      initial_capacity: self.initial_capacity,
      hasher,
      listener: self.listener,
    }
  }

  /// Sets the removal listener for the cache.
  ///
  /// The listener receives one notification per removed mapping, whatever
  /// the cause; see [`RemovalListener`] for the invocation contract.
  pub fn removal_listener<L>(mut self, listener: L) -> Self
  where
    L: RemovalListener<K, V> + 'static,
  {
    self.listener = Some(Arc::new(listener));
    self
  }

  /// Builds the unordered cache variant.
  pub fn build(self) -> WeakValueCache<K, V, H>
  where
    K: Eq + Hash + Clone,
    H: BuildHasher,
  {
    WeakValueCache::with_parts(self.initial_capacity, self.hasher, self.listener)
  }

  /// Builds the insertion-ordered cache variant.
  pub fn build_ordered(self) -> OrderedWeakValueCache<K, V, H>
  where
    K: Eq + Hash + Clone,
    H: BuildHasher,
  {
    OrderedWeakValueCache::with_parts(self.initial_capacity, self.hasher, self.listener)
  }
}
