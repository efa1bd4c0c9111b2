use std::sync::{Arc, Mutex};

use weakref_cache::{RemovalCause, RemovalListener};

/// One recorded listener invocation: (cause, key, old value, new value).
pub type Event<K, V> = (RemovalCause, K, Option<Arc<V>>, Option<Arc<V>>);

/// A listener that appends every notification to a shared log, so tests can
/// assert on exact counts and ordering.
pub struct RecordingListener<K, V> {
  events: Arc<Mutex<Vec<Event<K, V>>>>,
}

impl<K, V> RecordingListener<K, V> {
  pub fn new() -> (Self, Arc<Mutex<Vec<Event<K, V>>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    (
      Self {
        events: events.clone(),
      },
      events,
    )
  }
}

impl<K, V> RemovalListener<K, V> for RecordingListener<K, V>
where
  K: Send + Sync,
  V: Send + Sync,
{
  fn on_removal(
    &self,
    cause: RemovalCause,
    key: K,
    old_value: Option<Arc<V>>,
    new_value: Option<Arc<V>>,
  ) {
    self
      .events
      .lock()
      .unwrap()
      .push((cause, key, old_value, new_value));
  }
}
