use std::sync::Arc;

use weakref_cache::WeakValueCache;

#[test]
fn test_insert_and_get() {
  let cache: WeakValueCache<String, i32> = WeakValueCache::new();
  let value = Arc::new(10);
  cache.insert("key1".to_string(), &value);

  // Test get hit; the cache must hand back the same allocation.
  let fetched = cache.get(&"key1".to_string()).unwrap();
  assert!(Arc::ptr_eq(&fetched, &value));

  // Test get miss
  assert!(cache.get(&"non-existent".to_string()).is_none());

  let metrics = cache.metrics();
  assert_eq!(metrics.inserts, 1);
  assert_eq!(metrics.hits, 1);
  assert_eq!(metrics.misses, 1);
}

#[test]
fn test_replacement_returns_previous_value() {
  let cache: WeakValueCache<String, i32> = WeakValueCache::new();
  let one = Arc::new(1);
  let two = Arc::new(2);

  assert!(cache.insert("x".to_string(), &one).is_none());
  let previous = cache.insert("x".to_string(), &two).unwrap();
  assert!(Arc::ptr_eq(&previous, &one));

  let current = cache.get(&"x".to_string()).unwrap();
  assert!(Arc::ptr_eq(&current, &two));

  let metrics = cache.metrics();
  assert_eq!(metrics.inserts, 2, "Replacement counts as a second insert");
  assert_eq!(metrics.replacements, 1);
}

#[test]
fn test_remove() {
  let cache: WeakValueCache<String, i32> = WeakValueCache::new();
  let value = Arc::new(10);
  cache.insert("key1".to_string(), &value);

  let removed = cache.remove(&"key1".to_string()).unwrap();
  assert!(Arc::ptr_eq(&removed, &value));
  assert!(!cache.contains_key(&"key1".to_string()));
  assert!(cache.get(&"key1".to_string()).is_none());

  assert!(
    cache.remove(&"key1".to_string()).is_none(),
    "Double remove should find nothing"
  );
  assert_eq!(cache.metrics().removals, 1);
}

#[test]
fn test_contains_key() {
  let cache: WeakValueCache<i32, String> = WeakValueCache::new();
  let value = Arc::new("one".to_string());
  cache.insert(1, &value);

  assert!(cache.contains_key(&1));
  assert!(!cache.contains_key(&2));
}

#[test]
fn test_evict_all() {
  let cache: WeakValueCache<i32, String> = WeakValueCache::new();
  let values: Vec<Arc<String>> = (0..5).map(|i| Arc::new(format!("value-{i}"))).collect();
  for (i, value) in values.iter().enumerate() {
    cache.insert(i as i32, value);
  }
  assert_eq!(cache.len(), 5);

  cache.evict_all();

  assert!(cache.is_empty());
  for i in 0..5 {
    assert!(!cache.contains_key(&i));
  }
  assert_eq!(cache.metrics().cleared, 5);
}

#[test]
fn test_len_and_is_empty() {
  let cache: WeakValueCache<i32, i32> = WeakValueCache::new();
  assert!(cache.is_empty());

  let a = Arc::new(1);
  let b = Arc::new(2);
  cache.insert(1, &a);
  cache.insert(2, &b);
  assert_eq!(cache.len(), 2);

  // A replacement does not change the count.
  cache.insert(1, &b);
  assert_eq!(cache.len(), 2);

  cache.remove(&1);
  assert_eq!(cache.len(), 1);
}

#[test]
fn test_get_does_not_keep_value_alive() {
  let cache: WeakValueCache<i32, i32> = WeakValueCache::new();
  let value = Arc::new(42);
  cache.insert(1, &value);

  // The strong handle returned by get is the only thing extending the
  // value's lifetime beyond `value` itself.
  let fetched = cache.get(&1).unwrap();
  drop(value);
  assert!(cache.contains_key(&1), "Fetched Arc keeps the value alive");

  drop(fetched);
  assert!(!cache.contains_key(&1));
}
