use std::sync::{Arc, Weak};

/// A slot for a cached value, holding a non-owning handle to it.
///
/// The cache stores one `WeakEntry` per key. The entry never extends the
/// value's lifetime; once the last external `Arc<V>` is dropped, the entry
/// is dead and `upgrade` yields `None` forever after.
#[derive(Debug)]
pub(crate) struct WeakEntry<V> {
  handle: Weak<V>,
}

impl<V> WeakEntry<V> {
  /// Creates a new `WeakEntry` observing the caller's `Arc`.
  #[inline]
  pub(crate) fn new(value: &Arc<V>) -> Self {
    Self {
      handle: Arc::downgrade(value),
    }
  }

  /// Returns a strong handle to the value if it is still alive.
  ///
  /// Never yields a stale reference: a dead entry always returns `None`.
  #[inline]
  pub(crate) fn upgrade(&self) -> Option<Arc<V>> {
    self.handle.upgrade()
  }

  /// Checks whether the value has been dropped by all external owners.
  ///
  /// This is a cheap atomic load. Once true, it stays true.
  #[inline]
  pub(crate) fn is_collected(&self) -> bool {
    self.handle.strong_count() == 0
  }
}
