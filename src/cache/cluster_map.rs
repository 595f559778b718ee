//! Cluster Map Module
//!
//! The backing store behind [`CacheHandler`](crate::cache::CacheHandler): a keyed map
//! that any node of the cluster may read or write, with per-key locks for
//! whole-value replacement.

use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex};

/// Guard returned by [`DistributedMap::lock`]; the key is unlocked when it drops.
pub type KeyLockGuard = ArcMutexGuard<RawMutex, ()>;

// == Distributed Map Contract ==
/// Operations a cluster-shared key/value store must offer.
///
/// Values are handed out as shared references. Replacing a value goes through
/// [`DistributedMap::set`] and is only safe while holding the key's lock.
pub trait DistributedMap<K, V>: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &K) -> Option<Arc<V>>;

    /// Returns the value stored under `key`, inserting `create(key)` first if absent.
    fn get_or_create(&self, key: &K, create: &dyn Fn(&K) -> V) -> Arc<V>;

    /// Replaces the value stored under `key`.
    fn set(&self, key: K, value: Arc<V>);

    /// Removes and returns the value stored under `key`.
    fn remove(&self, key: &K) -> Option<Arc<V>>;

    /// Blocks until this caller holds the exclusive lock for `key`.
    fn lock(&self, key: &K) -> KeyLockGuard;

    /// Snapshot of every stored value.
    fn values(&self) -> Vec<Arc<V>>;

    /// Number of stored keys.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// == Local Cluster Map ==
/// Embedded [`DistributedMap`]. Nodes running in one process share a cluster by
/// sharing one instance behind an `Arc`.
#[derive(Debug)]
pub struct LocalClusterMap<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, Arc<V>>,
    locks: DashMap<K, Arc<Mutex<()>>>,
}

impl<K, V> LocalClusterMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            locks: DashMap::new(),
        }
    }
}

impl<K, V> Default for LocalClusterMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> DistributedMap<K, V> for LocalClusterMap<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Send + Sync,
{
    fn get(&self, key: &K) -> Option<Arc<V>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    fn get_or_create(&self, key: &K, create: &dyn Fn(&K) -> V) -> Arc<V> {
        if let Some(existing) = self.get(key) {
            return existing;
        }
        let entry = self
            .entries
            .entry(key.clone())
            .or_insert_with(|| Arc::new(create(key)));
        Arc::clone(entry.value())
    }

    fn set(&self, key: K, value: Arc<V>) {
        self.entries.insert(key, value);
    }

    fn remove(&self, key: &K) -> Option<Arc<V>> {
        self.entries.remove(key).map(|(_, value)| value)
    }

    fn lock(&self, key: &K) -> KeyLockGuard {
        // Lock objects outlive their entries so waiters never split across two mutexes
        let lock = Arc::clone(self.locks.entry(key.clone()).or_default().value());
        lock.lock_arc()
    }

    fn values(&self) -> Vec<Arc<V>> {
        self.entries
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_get_missing_key() {
        let map: LocalClusterMap<u32, String> = LocalClusterMap::new();
        assert!(map.get(&1).is_none());
        assert!(map.is_empty());
    }

    #[test]
    fn test_get_or_create_only_creates_once() {
        let map: LocalClusterMap<u32, String> = LocalClusterMap::new();
        let created = AtomicUsize::new(0);
        let create = |key: &u32| {
            created.fetch_add(1, Ordering::SeqCst);
            format!("value-{}", key)
        };

        let first = map.get_or_create(&1, &create);
        let second = map.get_or_create(&1, &create);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(created.load(Ordering::SeqCst), 1);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_set_replaces_and_remove_deletes() {
        let map: LocalClusterMap<u32, String> = LocalClusterMap::new();
        map.set(1, Arc::new("a".to_string()));
        map.set(1, Arc::new("b".to_string()));
        assert_eq!(map.get(&1).unwrap().as_str(), "b");

        assert_eq!(map.remove(&1).unwrap().as_str(), "b");
        assert!(map.remove(&1).is_none());
        assert!(map.is_empty());
    }

    #[test]
    fn test_values_snapshot() {
        let map: LocalClusterMap<u32, u32> = LocalClusterMap::new();
        for i in 0..5 {
            map.set(i, Arc::new(i * 10));
        }
        let mut values: Vec<u32> = map.values().iter().map(|v| **v).collect();
        values.sort_unstable();
        assert_eq!(values, vec![0, 10, 20, 30, 40]);
    }

    #[test]
    fn test_lock_is_exclusive_per_key() {
        let map: Arc<LocalClusterMap<u32, u32>> = Arc::new(LocalClusterMap::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let map = Arc::clone(&map);
                let inside = Arc::clone(&inside);
                let max_inside = Arc::clone(&max_inside);
                thread::spawn(move || {
                    for _ in 0..10 {
                        let _guard = map.lock(&7);
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_inside.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_micros(50));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_locks_on_different_keys_do_not_block() {
        let map: LocalClusterMap<u32, u32> = LocalClusterMap::new();
        let _first = map.lock(&1);
        // Would deadlock if keys shared a lock
        let _second = map.lock(&2);
    }
}
