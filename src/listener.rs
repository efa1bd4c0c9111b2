use std::fmt;
use std::sync::Arc;

/// Describes the reason a mapping was removed from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalCause {
  /// The mapping was displaced by an insert of the same key.
  Replaced,
  /// The mapping was removed by an explicit call to `remove`.
  Explicit,
  /// The mapping was removed by `evict_all`.
  Cleared,
  /// The mapping's value lost its last strong reference and the dead entry
  /// was purged on a subsequent cache operation.
  Collected,
}

impl RemovalCause {
  /// Returns `true` when the removal was driven by the cache itself
  /// (`Cleared`, `Collected`) rather than by a caller replacing or removing
  /// a specific key.
  pub fn was_evicted(&self) -> bool {
    matches!(self, RemovalCause::Cleared | RemovalCause::Collected)
  }
}

impl fmt::Display for RemovalCause {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RemovalCause::Replaced => write!(f, "replaced by a newer insert"),
      RemovalCause::Explicit => write!(f, "explicitly removed"),
      RemovalCause::Cleared => write!(f, "cleared by evict_all"),
      RemovalCause::Collected => write!(f, "value collected, entry purged"),
    }
  }
}

/// A listener that can be registered with the cache to receive a
/// notification for every mapping removal, whatever its cause.
///
/// `on_removal` is always invoked *after* the cache's internal lock has been
/// released, so implementations may safely re-enter the cache. For
/// `insert`/`remove`/`evict_all` it runs synchronously on the calling
/// thread before the operation returns; for `Collected` purges it runs on
/// whichever thread's operation happened to sweep the dead entry.
///
/// Argument conventions:
/// - `Replaced`: `old_value` is the displaced value, `new_value` the
///   replacement.
/// - `Explicit` / `Cleared`: `old_value` is the removed value if it was
///   still alive at removal time, `new_value` is `None`.
/// - `Collected`: both are `None`; the value was already gone by the time
///   the purge observed the entry.
///
/// A panicking listener aborts only the caller's current operation; the map
/// mutation has already taken effect by the time the listener runs.
pub trait RemovalListener<K, V>: Send + Sync {
  fn on_removal(
    &self,
    cause: RemovalCause,
    key: K,
    old_value: Option<Arc<V>>,
    new_value: Option<Arc<V>>,
  );
}
